// File: cli.rs
use crate::config::PopulationSizes;
use crate::population::Species;
use clap::Parser;
use clap::error::ErrorKind;

#[derive(Parser, Debug)]
#[command(name = "envsim", args_override_self = true)]
struct Cli {
    /// Number of plants to initialize
    #[arg(long, value_name = "#")]
    plnt: Option<usize>,

    /// Number of herbivores to initialize
    #[arg(long, value_name = "#")]
    herb: Option<usize>,

    /// Number of predators to initialize
    #[arg(long, value_name = "#")]
    pred: Option<usize>,
}

impl Cli {
    fn count(&self, species: Species) -> Option<usize> {
        match species {
            Species::Plant => self.plnt,
            Species::Herbivore => self.herb,
            Species::Predator => self.pred,
        }
    }
}

/// Populations to start with, plus the species whose count was given explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    pub sizes: PopulationSizes,
    pub initialized: Vec<Species>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(RunArgs),
    Help,
}

// Flags keep their historical single-dash spelling on the command line
fn long_form(arg: &str) -> String {
    match arg {
        "-h" => "--help".to_string(),
        "-plnt" | "-herb" | "-pred" => format!("-{}", arg),
        other => other.to_string(),
    }
}

/// Parses the arguments after the program name. A repeated population flag
/// keeps the last value.
pub fn parse_args<I, S>(args: I) -> Result<Command, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv = std::iter::once("envsim".to_string())
        .chain(args.into_iter().map(|arg| long_form(arg.as_ref())));

    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(err) if err.kind() == ErrorKind::DisplayHelp => return Ok(Command::Help),
        Err(err) => return Err(err),
    };

    let mut sizes = PopulationSizes::default();
    let mut initialized = Vec::new();
    for species in Species::ALL {
        if let Some(count) = cli.count(species) {
            sizes.set(species, count);
            initialized.push(species);
        }
    }
    Ok(Command::Run(RunArgs { sizes, initialized }))
}

/// First line of a parse error, with flags shown the way users type them.
pub fn error_message(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first
        .trim_start_matches("error: ")
        .replace("'--", "'-")
}

pub fn usage() -> String {
    [
        "***EnvSim arguments***",
        "Note: the \"#\" means a natural number (# >= 0)",
        "   [none]  :: run with the default populations.",
        "   -h      :: print this help list.",
        "   -plnt # :: number of plants to initialize.",
        "   -herb # :: number of herbivores to initialize.",
        "   -pred # :: number of predators to initialize.",
        "Flags can be combined:",
        "   (e.g.) $ envsim -plnt 50 -herb 100 -pred 20",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(args: &[&str]) -> RunArgs {
        match parse_args(args) {
            Ok(Command::Run(run)) => run,
            other => panic!("expected a run command, got {:?}", other),
        }
    }

    #[test]
    fn test_no_arguments_gives_defaults() {
        let run = run_args(&[]);
        assert_eq!(run.sizes, PopulationSizes::default());
        assert!(run.initialized.is_empty());
    }

    #[test]
    fn test_all_flags_combined() {
        let run = run_args(&["-plnt", "50", "-herb", "100", "-pred", "0"]);
        assert_eq!(run.sizes, PopulationSizes::new(50, 100, 0));
        assert_eq!(run.initialized, Species::ALL.to_vec());
    }

    #[test]
    fn test_partial_flags_keep_other_defaults() {
        let run = run_args(&["-herb", "7"]);
        let defaults = PopulationSizes::default();
        assert_eq!(run.sizes.herbivores, 7);
        assert_eq!(run.sizes.plants, defaults.plants);
        assert_eq!(run.sizes.predators, defaults.predators);
        assert_eq!(run.initialized, vec![Species::Herbivore]);
    }

    #[test]
    fn test_repeated_flag_keeps_last_value() {
        let run = run_args(&["-pred", "3", "-pred", "9"]);
        assert_eq!(run.sizes.predators, 9);
    }

    #[test]
    fn test_help() {
        assert!(matches!(parse_args(["-h"]), Ok(Command::Help)));
        assert!(matches!(parse_args(["-plnt", "5", "-h"]), Ok(Command::Help)));
        assert!(usage().contains("-plnt"));
    }

    #[test]
    fn test_rejected_arguments() {
        for args in [
            &["plnt", "5"][..],
            &["-pred"][..],
            &["-plnt", "-3"][..],
            &["-herb", "lots"][..],
        ] {
            let err = parse_args(args).unwrap_err();
            assert_ne!(err.kind(), ErrorKind::DisplayHelp);
            assert!(!error_message(&err).is_empty());
        }
    }

    #[test]
    fn test_error_message_uses_single_dash_flags() {
        let err = parse_args(["-herb", "lots"]).unwrap_err();
        let message = error_message(&err);
        assert!(message.contains("lots"));
        assert!(!message.contains("--herb"));
    }
}
