// Exit codes for scripted runs
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_GENERIC_FAIL: i32 = 1;
/// Unparseable or conflicting arguments.
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_VALIDATION_FAIL: i32 = 4;

/// Exit code for an argument-parsing outcome. `--help` and `--version`
/// surface as clap errors too, but succeed.
pub fn parse_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cli;
    use clap::Parser;

    fn parse_err(args: &[&str]) -> clap::Error {
        Cli::try_parse_from(std::iter::once("memstream").chain(args.iter().copied())).unwrap_err()
    }

    #[test]
    fn bad_arguments_map_to_usage() {
        assert_eq!(parse_exit_code(&parse_err(&["--only", "Scale"])), EXIT_USAGE);
        assert_eq!(parse_exit_code(&parse_err(&["--csv", "--json"])), EXIT_USAGE);
        assert_eq!(parse_exit_code(&parse_err(&["--no-such-flag"])), EXIT_USAGE);
    }

    #[test]
    fn help_and_version_succeed() {
        assert_eq!(parse_exit_code(&parse_err(&["--help"])), EXIT_SUCCESS);
        assert_eq!(parse_exit_code(&parse_err(&["--version"])), EXIT_SUCCESS);
    }
}
