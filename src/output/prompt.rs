//! Password-prompt detection over sanitized output.

/// Tokens that mark a prompt line, checked case-insensitively.
const PROMPT_TOKENS: &[&str] = &["password", "passphrase", "密码"];

/// Detect a password prompt in sanitized, server-originating text.
///
/// A colon-terminated line matches when it contains a password/passphrase
/// token anywhere (`user@host's password:`, `[sudo] password for deploy:`,
/// the localized `密码：`); without a colon the line must end with the token
/// (`Enter passphrase`), so prose that merely mentions passwords does not
/// trigger masking.
pub fn detect_password_prompt(text: &str) -> bool {
    text.lines().any(is_prompt_line)
}

fn is_prompt_line(line: &str) -> bool {
    let lower = line.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }
    match lower.strip_suffix(':').or_else(|| lower.strip_suffix('：')) {
        Some(body) => PROMPT_TOKENS.iter().any(|token| body.contains(token)),
        None => PROMPT_TOKENS.iter().any(|token| lower.ends_with(token)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_prompt() {
        assert!(detect_password_prompt("Password:"));
        assert!(detect_password_prompt("password"));
    }

    #[test]
    fn test_ssh_style_prompt() {
        assert!(detect_password_prompt("user@example.com's password: "));
    }

    #[test]
    fn test_sudo_style_prompt() {
        assert!(detect_password_prompt("[sudo] password for deploy:"));
    }

    #[test]
    fn test_passphrase_prompt() {
        assert!(detect_password_prompt("Enter passphrase"));
        assert!(detect_password_prompt("Enter passphrase for key '/home/d/.ssh/id_ed25519':"));
    }

    #[test]
    fn test_localized_prompt() {
        assert!(detect_password_prompt("请输入密码："));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(detect_password_prompt("PASSWORD:"));
    }

    #[test]
    fn test_multiline_scan() {
        assert!(detect_password_prompt("connecting...\nsudo password:"));
    }

    #[test]
    fn test_no_match_in_prose() {
        // No trailing colon and the token doesn't end the line.
        assert!(!detect_password_prompt("password rules are documented here"));
    }

    #[test]
    fn test_no_match_plain_output() {
        assert!(!detect_password_prompt("total 12\n-rw-r--r-- file.txt"));
        assert!(!detect_password_prompt(""));
    }
}
