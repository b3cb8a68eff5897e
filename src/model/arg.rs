use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

/// Docker Hub command line client
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Credentials file path
    #[arg(long, global = true)]
    pub credentials: Option<String>,

    /// Log requests at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log request and response bodies
    #[arg(long, global = true)]
    pub trace: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in to Docker Hub
    Login {
        /// Account name, defaults to DOCKER_USERNAME or a prompt
        username: Option<String>,
    },

    /// Forget the cached credentials
    Logout,

    /// Manage your account
    #[command(subcommand)]
    Account(AccountCommand),

    /// Manage repositories
    #[command(subcommand)]
    Repo(RepoCommand),

    /// Manage tags
    #[command(subcommand)]
    Tag(TagCommand),

    /// Manage organizations
    #[command(subcommand)]
    Org(OrgCommand),

    /// Manage personal access tokens
    #[command(subcommand)]
    Token(TokenCommand),

    /// Show the client version
    Version,
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// Print the account information
    Info {
        /// Organization to describe instead of the logged in account
        organization: Option<String>,
        #[command(flatten)]
        output: FormatArg,
    },
    /// Print the current pull rate limits
    RateLimiting {
        #[command(flatten)]
        output: FormatArg,
    },
}

#[derive(Subcommand, Debug)]
pub enum RepoCommand {
    /// List repositories
    #[command(visible_alias = "list")]
    Ls {
        /// Account or organization, defaults to the logged in account
        account: Option<String>,
        #[command(flatten)]
        pages: PageArgs,
        #[command(flatten)]
        output: FormatArg,
    },
    /// Delete a repository
    Rm {
        repository: String,
        #[command(flatten)]
        force: ForceArg,
    },
}

#[derive(Subcommand, Debug)]
pub enum TagCommand {
    /// List the tags of a repository
    #[command(visible_alias = "list")]
    Ls {
        repository: String,
        #[command(flatten)]
        pages: PageArgs,
        /// Sort by `name` or `updated`, optionally suffixed with `=asc` or `=desc`
        #[arg(long)]
        sort: Option<String>,
        #[command(flatten)]
        output: FormatArg,
    },
    /// Delete a tag
    Rm {
        /// Reference in `repository:tag` form
        reference: String,
        #[command(flatten)]
        force: ForceArg,
    },
}

#[derive(Subcommand, Debug)]
pub enum OrgCommand {
    /// List the organizations you belong to
    #[command(visible_alias = "list")]
    Ls {
        #[command(flatten)]
        output: FormatArg,
    },
    /// List the members of an organization
    Members {
        organization: String,
        #[command(flatten)]
        output: FormatArg,
    },
    /// List the teams of an organization
    Teams {
        organization: String,
        #[command(flatten)]
        output: FormatArg,
    },
    /// Print the organization settings
    Settings {
        organization: String,
        #[command(flatten)]
        output: FormatArg,
    },
}

#[derive(Subcommand, Debug)]
pub enum TokenCommand {
    /// List personal access tokens
    #[command(visible_alias = "list")]
    Ls {
        #[command(flatten)]
        pages: PageArgs,
        #[command(flatten)]
        output: FormatArg,
    },
    /// Create a personal access token
    Create {
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Print a personal access token
    Inspect {
        uuid: Uuid,
        #[command(flatten)]
        output: FormatArg,
    },
    /// Change the description or the state of a personal access token
    Update {
        uuid: Uuid,
        /// New description, unchanged when omitted
        #[arg(long)]
        description: Option<String>,
        /// Activate or deactivate the token, unchanged when omitted
        #[arg(long)]
        set_active: Option<bool>,
    },
    /// Activate a personal access token
    Activate { uuid: Uuid },
    /// Deactivate a personal access token
    Deactivate { uuid: Uuid },
    /// Delete a personal access token
    Rm {
        uuid: Uuid,
        #[command(flatten)]
        force: ForceArg,
    },
}

#[derive(ClapArgs, Debug, Clone, Copy)]
pub struct PageArgs {
    /// Fetch every page instead of the first one
    #[arg(long)]
    pub all: bool,
}

/// Machine readable output
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
}

#[derive(ClapArgs, Debug, Clone, Copy)]
pub struct FormatArg {
    /// Print values in the given format instead of text
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

#[derive(ClapArgs, Debug, Clone, Copy)]
pub struct ForceArg {
    /// Do not ask for confirmation
    #[arg(short, long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_tag_ls() {
        let args = Args::parse_from(["hub-rs", "--verbose", "tag", "ls", "nginx", "--all", "--sort", "name=desc"]);
        assert!(args.verbose);
        match args.command {
            Command::Tag(TagCommand::Ls {
                repository,
                pages,
                sort,
                output,
            }) => {
                assert_eq!(repository, "nginx");
                assert!(pages.all);
                assert_eq!(sort.as_deref(), Some("name=desc"));
                assert!(output.format.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_token_uuid_is_validated() {
        assert!(Args::try_parse_from(["hub-rs", "token", "inspect", "not-a-uuid"]).is_err());
        let args = Args::parse_from([
            "hub-rs",
            "token",
            "rm",
            "8208674e-d08a-426f-b6f4-e3aba7058459",
            "--force",
        ]);
        assert!(matches!(args.command, Command::Token(TokenCommand::Rm { force, .. }) if force.force));
    }

    #[test]
    fn test_format_flag() {
        let args = Args::parse_from(["hub-rs", "org", "settings", "acme", "--format", "json"]);
        match args.command {
            Command::Org(OrgCommand::Settings { organization, output }) => {
                assert_eq!(organization, "acme");
                assert_eq!(output.format, Some(OutputFormat::Json));
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(Args::try_parse_from(["hub-rs", "org", "ls", "--format", "yaml"]).is_err());
    }

    #[test]
    fn test_account_info_for_organization() {
        let args = Args::parse_from(["hub-rs", "account", "info", "acme"]);
        assert!(matches!(
            args.command,
            Command::Account(AccountCommand::Info { organization: Some(ref org), .. }) if org == "acme"
        ));
    }

    #[test]
    fn test_token_update_keeps_omitted_fields() {
        let args = Args::parse_from([
            "hub-rs",
            "token",
            "update",
            "8208674e-d08a-426f-b6f4-e3aba7058459",
            "--set-active",
            "false",
        ]);
        match args.command {
            Command::Token(TokenCommand::Update {
                description,
                set_active,
                ..
            }) => {
                assert!(description.is_none());
                assert_eq!(set_active, Some(false));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
