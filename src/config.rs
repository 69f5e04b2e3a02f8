//! Command-line arguments and the validated run configuration built from them.

use std::ffi::OsString;

use clap::Parser;

use crate::builder::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};
use crate::entry::TypeFilter;
use crate::error::RenameError;
use crate::rule::RenameRule;

/// Rename files and directories with regular expressions
#[derive(Parser, Debug, Clone)]
#[command(
    name = "regren",
    version,
    about = "Rename files and directories with regular expressions",
    long_about = "Walks every path matched by the given glob patterns and renames each entry \
                  whose name matches --match, replacing every match with --replace.\n\n\
                  Only the file name is matched and rewritten; entries stay in their directory. \
                  Replacements may use capture groups ($1, ${name}).",
    after_help = "EXAMPLES:\n    \
        regren --match '(.*)\\.txt$' --replace '$1.bak' --forext txt .\n    \
        regren --match ' ' --replace '_' --fileonly --dryrun 'photos/*'\n    \
        regren --match '^draft-' --replace '' --dironly -c 8 docs\n\n\
        The single-dash spellings -match, -replace, -fileonly, -dironly, -forext\n\
        and -dryrun are accepted as aliases of the double-dash flags."
)]
pub struct CliArgs {
    /// Glob patterns for the roots to walk
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<String>,

    /// Regular expression matched against each file name (never the full path)
    #[arg(long = "match", default_value = ".", value_name = "REGEX")]
    pub pattern: String,

    /// Replacement for every match; supports $1 and ${name} back-references
    #[arg(long = "replace", value_name = "TEMPLATE")]
    pub replacement: Option<String>,

    /// Only rename entries that are not directories
    #[arg(long = "fileonly", conflicts_with = "dir_only")]
    pub file_only: bool,

    /// Only rename directories
    #[arg(long = "dironly")]
    pub dir_only: bool,

    /// Only consider names ending in .<EXT> (EXT is a regex fragment)
    #[arg(long = "forext", value_name = "EXT")]
    pub for_ext: Option<String>,

    /// Print the renames without touching the filesystem
    #[arg(long = "dryrun")]
    pub dry_run: bool,

    /// Number of concurrent rename workers
    #[arg(short = 'c', long = "concurrency", default_value_t = DEFAULT_WORKERS, value_name = "NUM")]
    pub workers: usize,

    /// Capacity of the work and result queues
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY, value_name = "NUM")]
    pub queue_size: usize,

    /// Verbose logging on stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Long flags that may also be spelled with a single dash.
const SINGLE_DASH_FLAGS: &[&str] = &["match", "replace", "fileonly", "dironly", "forext", "dryrun"];

/// Flags whose next argument is a value, never a flag.
const VALUE_FLAGS: &[&str] = &["--match", "--replace", "--forext", "-c", "--concurrency", "--queue-size"];

/// Rewrite single-dash long flags (`-match a`, `-forext=txt`) to their
/// double-dash form so clap can parse them. Values of flags that take one
/// are left alone, as is everything after a bare `--`.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = Vec::new();
    let mut expect_value = false;
    let mut passthrough = false;

    for arg in args.into_iter().map(Into::into) {
        if passthrough || expect_value {
            expect_value = false;
            out.push(arg);
            continue;
        }

        let Some(text) = arg.to_str() else {
            out.push(arg);
            continue;
        };
        if text == "--" {
            passthrough = true;
            out.push(arg);
            continue;
        }

        let rewritten = match text.strip_prefix('-') {
            Some(rest) if !rest.starts_with('-') => {
                let name = rest.split('=').next().unwrap_or(rest);
                SINGLE_DASH_FLAGS.contains(&name).then(|| format!("-{text}"))
            }
            _ => None,
        };
        let flag = rewritten.as_deref().unwrap_or(text);
        expect_value = VALUE_FLAGS.contains(&flag);

        out.push(rewritten.map(OsString::from).unwrap_or(arg));
    }
    out
}

/// Validated configuration for one run.
#[derive(Debug, Clone)]
pub struct RenameConfig {
    pub paths:          Vec<String>,
    pub rule:           RenameRule,
    pub type_filter:    TypeFilter,
    pub workers:        usize,
    pub queue_capacity: usize,
    pub dry_run:        bool,
}

impl RenameConfig {
    /// Validate CLI arguments into a run configuration.
    ///
    /// # Errors
    ///
    /// `EmptyPattern` / `EmptyReplacement` when either is blank or missing,
    /// `InvalidPattern` when a regex does not compile, `InvalidWorkerCount`
    /// for `-c 0`.
    pub fn from_args(args: CliArgs) -> Result<Self, RenameError> {
        let replacement = args.replacement.unwrap_or_default();
        let rule = RenameRule::new(&args.pattern, &replacement, args.for_ext.as_deref())?;

        if args.workers == 0 {
            return Err(RenameError::InvalidWorkerCount(args.workers));
        }

        let type_filter = if args.dir_only {
            TypeFilter::DirsOnly
        } else if args.file_only {
            TypeFilter::FilesOnly
        } else {
            TypeFilter::Any
        };

        Ok(Self {
            paths: args.paths,
            rule,
            type_filter,
            workers: args.workers,
            queue_capacity: args.queue_size,
            dry_run: args.dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs, clap::Error> {
        CliArgs::try_parse_from(std::iter::once("regren").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let args = parse(&["--replace", "x", "."]).unwrap();
        assert_eq!(args.pattern, ".");
        assert_eq!(args.workers, 2);
        assert_eq!(args.queue_size, 1000);
        assert!(!args.dry_run);

        let config = RenameConfig::from_args(args).unwrap();
        assert_eq!(config.type_filter, TypeFilter::Any);
        assert_eq!(config.paths, vec!["."]);
    }

    #[test]
    fn full_flag_set() {
        let args = parse(&[
            "--match", r"(.*)\.txt$",
            "--replace", "$1.bak",
            "--forext", "txt",
            "--fileonly",
            "--dryrun",
            "-c", "8",
            "a", "b*",
        ])
        .unwrap();
        let config = RenameConfig::from_args(args).unwrap();

        assert_eq!(config.type_filter, TypeFilter::FilesOnly);
        assert_eq!(config.workers, 8);
        assert!(config.dry_run);
        assert_eq!(config.paths, vec!["a", "b*"]);
        assert_eq!(config.rule.apply("a.txt"), Some(OsString::from("a.bak")));
        assert_eq!(config.rule.apply("a.md"), None);
    }

    #[test]
    fn dir_only() {
        let args = parse(&["--replace", "x", "--dironly", "."]).unwrap();
        assert_eq!(RenameConfig::from_args(args).unwrap().type_filter, TypeFilter::DirsOnly);
    }

    #[test]
    fn file_only_and_dir_only_conflict() {
        assert!(parse(&["--replace", "x", "--fileonly", "--dironly", "."]).is_err());
    }

    #[test]
    fn paths_are_required() {
        assert!(parse(&["--replace", "x"]).is_err());
    }

    #[test]
    fn missing_replacement_is_rejected() {
        let args = parse(&["--match", "a", "."]).unwrap();
        assert!(matches!(RenameConfig::from_args(args), Err(RenameError::EmptyReplacement)));
    }

    #[test]
    fn empty_match_is_rejected() {
        let args = parse(&["--match", "", "--replace", "x", "."]).unwrap();
        assert!(matches!(RenameConfig::from_args(args), Err(RenameError::EmptyPattern)));
    }

    #[test]
    fn single_dash_long_flags_are_accepted() {
        let argv = normalize_args([
            "regren", "-match", "a", "-replace", "b", "-forext=txt", "-fileonly", "-dryrun", "-c", "3", ".",
        ]);
        let args = CliArgs::try_parse_from(argv).unwrap();

        assert_eq!(args.pattern, "a");
        assert_eq!(args.replacement.as_deref(), Some("b"));
        assert_eq!(args.for_ext.as_deref(), Some("txt"));
        assert!(args.file_only && args.dry_run);
        assert_eq!(args.workers, 3);
    }

    #[test]
    fn flag_values_are_never_rewritten() {
        let argv = normalize_args(["regren", "--replace", "-dryrun", "-match", "-fileonly", "--", "-dironly"]);
        assert_eq!(
            argv,
            ["regren", "--replace", "-dryrun", "--match", "-fileonly", "--", "-dironly"]
                .map(OsString::from)
                .to_vec()
        );
    }

    #[test]
    fn zero_workers_is_rejected() {
        let args = parse(&["--replace", "x", "-c", "0", "."]).unwrap();
        assert!(matches!(RenameConfig::from_args(args), Err(RenameError::InvalidWorkerCount(0))));
    }
}
