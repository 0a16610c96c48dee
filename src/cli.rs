use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "looksee", version, about = "Inspect method lookup paths")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where classes and objects come from. Exactly one is required.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// JSON model manifest describing classes, modules, and objects
    #[arg(long, value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Directory of Python sources
    #[arg(long, value_name = "DIR")]
    pub python: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the method lookup path of an object
    Ls {
        /// Object, module, or class to inspect
        object: String,

        /// Visibilities (:private, :nopublic, ...), substrings, or /regexps/
        specifiers: Vec<String>,

        #[command(flatten)]
        source: SourceArgs,

        /// Inspect a new instance of the named class
        #[arg(long)]
        instance: bool,

        /// Output width in columns
        #[arg(short, long)]
        width: Option<usize>,

        /// Disable styling
        #[arg(long)]
        no_color: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show which module a method resolves to, and where it is defined
    Which {
        object: String,

        method: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Look the method up on a new instance of the named class
        #[arg(long)]
        instance: bool,
    },

    /// Open the definition of a method in an editor
    Edit {
        object: String,

        method: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Look the method up on a new instance of the named class
        #[arg(long)]
        instance: bool,

        /// Editor command; %f is the file, %l the line
        #[arg(long)]
        editor: Option<String>,
    },

    /// Show a quick reference
    Quickref {
        /// Disable styling
        #[arg(long)]
        no_color: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ls_with_specifiers() {
        let cli = Cli::try_parse_from([
            "looksee", "ls", "Derived", ":private", "/^to_/", "--model", "model.json", "-w", "60",
        ])
        .unwrap();
        let Command::Ls {
            object,
            specifiers,
            source,
            width,
            format,
            ..
        } = cli.command
        else {
            panic!("expected ls");
        };
        assert_eq!(object, "Derived");
        assert_eq!(specifiers, vec![":private", "/^to_/"]);
        assert_eq!(source.model, Some(PathBuf::from("model.json")));
        assert_eq!(width, Some(60));
        assert_eq!(format, OutputFormat::Text);
    }

    #[test]
    fn source_is_required() {
        assert!(Cli::try_parse_from(["looksee", "ls", "Derived"]).is_err());
    }

    #[test]
    fn sources_are_exclusive() {
        assert!(
            Cli::try_parse_from([
                "looksee", "which", "C", "f", "--model", "m.json", "--python", "src"
            ])
            .is_err()
        );
    }

    #[test]
    fn parses_json_format() {
        let cli = Cli::try_parse_from([
            "looksee", "ls", "Shape", "--python", "src", "--format", "json",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Ls {
                format: OutputFormat::Json,
                ..
            }
        ));
    }

    #[test]
    fn quickref_needs_no_source() {
        let cli = Cli::try_parse_from(["looksee", "quickref", "--no-color"]).unwrap();
        assert!(matches!(cli.command, Command::Quickref { no_color: true }));
    }
}
