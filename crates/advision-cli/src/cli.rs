//! Command line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "advision", version, about = "AdVision marketing analytics client")]
pub struct Cli {
    /// API base URL for this run (overrides ADVISION_API_URL and the config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
        /// Remember the password in the OS keychain
        #[arg(long)]
        remember: bool,
    },
    /// Remove the stored session token
    Logout {
        /// Also delete the password remembered in the keychain
        #[arg(long)]
        forget: bool,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        organization: Option<String>,
    },
    /// Show the signed-in user
    Whoami,
    /// Show local session state
    Status,
    /// Dashboard summary and first page of campaigns
    Overview,
    #[command(subcommand)]
    Campaigns(CampaignCommand),
    #[command(subcommand)]
    Creatives(CreativeCommand),
    #[command(subcommand)]
    Analytics(AnalyticsCommand),
    #[command(subcommand)]
    Ml(MlCommand),
    #[command(subcommand)]
    Docs(DocsCommand),
    /// Ask the AI assistant
    Chat(ChatArgs),
    /// Quick AI insights, optionally for one campaign
    Insights {
        #[arg(long)]
        campaign: Option<String>,
    },
}

impl Command {
    /// Whether the command calls an endpoint that expects a signed-in user.
    pub fn needs_session(&self) -> bool {
        !matches!(
            self,
            Command::Login { .. }
                | Command::Logout { .. }
                | Command::Register { .. }
                | Command::Status
        )
    }
}

#[derive(Debug, Subcommand)]
pub enum CampaignCommand {
    List {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = 100)]
        limit: u32,
        /// Print ROI and CTR per campaign instead of raw JSON
        #[arg(long)]
        metrics: bool,
    },
    Get {
        id: String,
    },
    Create(NewCampaignArgs),
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct NewCampaignArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub platform: String,
    #[arg(long)]
    pub budget: Option<f64>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub start: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum CreativeCommand {
    Upload {
        campaign: String,
        file: PathBuf,
    },
    List {
        campaign: String,
    },
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum AnalyticsCommand {
    Dashboard,
    Roi {
        #[arg(long)]
        campaign: Option<String>,
    },
    /// Simulate the outcome of a new budget
    Simulate {
        campaign: String,
        budget: f64,
    },
}

#[derive(Debug, Subcommand)]
pub enum MlCommand {
    Predict {
        campaign: String,
    },
    /// Trust score and badge level for a creative
    Trust {
        creative: String,
    },
    Analyze {
        creative: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum DocsCommand {
    Upload {
        file: PathBuf,
    },
    List,
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Search the knowledge base
    Query {
        query: String,
        #[arg(short = 'n', long, default_value_t = advision_core::api::DEFAULT_QUERY_RESULTS)]
        results: u32,
    },
}

#[derive(Debug, Args)]
pub struct ChatArgs {
    pub message: String,
    /// Answer without knowledge-base retrieval
    #[arg(long)]
    pub no_rag: bool,
    /// JSON file with prior turns: [{"role": "user", "content": "..."}]
    #[arg(long)]
    pub history: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_campaign_list_defaults() {
        let cli = Cli::try_parse_from(["advision", "campaigns", "list"]).unwrap();
        match cli.command {
            Command::Campaigns(CampaignCommand::List { skip, limit, metrics }) => {
                assert_eq!((skip, limit, metrics), (0, 100, false));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_docs_query_default_results() {
        let cli = Cli::try_parse_from(["advision", "docs", "query", "refund policy"]).unwrap();
        match cli.command {
            Command::Docs(DocsCommand::Query { query, results }) => {
                assert_eq!(query, "refund policy");
                assert_eq!(results, 5);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_chat_flags() {
        let cli = Cli::try_parse_from(["advision", "chat", "--no-rag", "hello"]).unwrap();
        match cli.command {
            Command::Chat(args) => {
                assert_eq!(args.message, "hello");
                assert!(args.no_rag);
                assert!(args.history.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_delete_confirmation_flag() {
        let cli = Cli::try_parse_from(["advision", "campaigns", "delete", "42"]).unwrap();
        match cli.command {
            Command::Campaigns(CampaignCommand::Delete { id, yes }) => {
                assert_eq!(id, "42");
                assert!(!yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["advision", "docs", "delete", "-y", "7"]).unwrap();
        assert!(matches!(cli.command, Command::Docs(DocsCommand::Delete { yes: true, .. })));

        let cli = Cli::try_parse_from(["advision", "creatives", "delete", "--yes", "3"]).unwrap();
        assert!(matches!(cli.command, Command::Creatives(CreativeCommand::Delete { yes: true, .. })));
    }

    #[test]
    fn test_needs_session() {
        let parse = |args: &[&str]| Cli::try_parse_from(args.iter().copied()).unwrap().command;

        assert!(!parse(&["advision", "login"]).needs_session());
        assert!(!parse(&["advision", "logout"]).needs_session());
        assert!(!parse(&["advision", "status"]).needs_session());
        assert!(!parse(&["advision", "register", "--email", "a@b.c", "--full-name", "A"]).needs_session());

        assert!(parse(&["advision", "whoami"]).needs_session());
        assert!(parse(&["advision", "overview"]).needs_session());
        assert!(parse(&["advision", "docs", "list"]).needs_session());
        assert!(parse(&["advision", "insights"]).needs_session());
    }

    #[test]
    fn test_parse_global_api_url() {
        let cli = Cli::try_parse_from([
            "advision",
            "--api-url",
            "https://api.example.com",
            "status",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("https://api.example.com"));
    }
}
