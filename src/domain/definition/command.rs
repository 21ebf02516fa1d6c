// Copyright 2025 ecsctl contributors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Shell-like tokenization of command override strings.

use crate::shared::error::{EcsError, Result};

/// Splits a command string into an argument vector. Whitespace separates
/// tokens; quoted substrings keep embedded spaces as a single token.
/// Unbalanced quotes are an error.
pub fn parse_command_override(command: &str) -> Result<Vec<String>> {
    shell_words::split(command)
        .map_err(|e| EcsError::InvalidCommandSyntax(format!("{}: {}", e, command)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_tokens() {
        let parsed = parse_command_override("node src/bin/cli.js generate-snapshots").unwrap();
        assert_eq!(parsed, vec!["node", "src/bin/cli.js", "generate-snapshots"]);
    }

    #[test]
    fn test_quoted_segment_is_one_token() {
        let parsed = parse_command_override("sh -c \"echo hi there\"").unwrap();
        assert_eq!(parsed, vec!["sh", "-c", "echo hi there"]);
    }

    #[test]
    fn test_quoted_segment_with_semicolons() {
        let parsed = parse_command_override(
            "sh -c \"/var/www/crons; php /var/www/app/Console/cake.php cron generate\"",
        )
        .unwrap();
        assert_eq!(
            parsed,
            vec![
                "sh",
                "-c",
                "/var/www/crons; php /var/www/app/Console/cake.php cron generate",
            ]
        );
    }

    #[test]
    fn test_unbalanced_quote_is_error() {
        let err = parse_command_override("sh -c \"echo oops").unwrap_err();
        assert!(matches!(err, EcsError::InvalidCommandSyntax(_)));
    }

    #[test]
    fn test_round_trip_preserves_unquoted_tokens() {
        let input = "php artisan queue:work sqs-sns";
        let parsed = parse_command_override(input).unwrap();
        assert_eq!(parsed.join(" "), input);
    }
}
