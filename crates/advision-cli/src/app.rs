//! Command handlers.
//!
//! `App` owns the config, the on-disk session store and the API client, and
//! listens for session invalidation while a command runs.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::{info, warn};

use advision_core::api::FileUpload;
use advision_core::auth::{CredentialStore, FileSessionStore, SessionStore};
use advision_core::models::{ChatTurn, LoginRequest, NewCampaign, Page, RegisterRequest};
use advision_core::{ApiClient, Config, SessionInvalidated};

use crate::cli::{
    AnalyticsCommand, CampaignCommand, ChatArgs, Command, CreativeCommand, DocsCommand, MlCommand,
    NewCampaignArgs,
};
use crate::output::{campaign_metrics_table, print_json, trust_summary};

/// A command that calls the API was run without a stored session.
#[derive(Debug, thiserror::Error)]
#[error("Not signed in")]
pub struct SignInRequired;

pub struct App {
    config: Config,
    session: Arc<FileSessionStore>,
    api: ApiClient,
    invalidations: broadcast::Receiver<SessionInvalidated>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let session = Arc::new(FileSessionStore::new(config.cache_dir()?));
        Self::with_session(config, session)
    }

    fn with_session(config: Config, session: Arc<FileSessionStore>) -> Result<Self> {
        let api = ApiClient::new(&config, session.clone()).context("Failed to create API client")?;
        let invalidations = api.subscribe();

        Ok(Self {
            config,
            session,
            api,
            invalidations,
        })
    }

    /// The invalidation event raised while the last command ran, if any.
    pub fn take_invalidation(&mut self) -> Option<SessionInvalidated> {
        self.invalidations.try_recv().ok()
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        self.ensure_session(&command)?;

        match command {
            Command::Login {
                email,
                password,
                remember,
            } => self.login(email, password, remember).await,
            Command::Logout { forget } => self.logout(forget),
            Command::Register {
                email,
                full_name,
                organization,
            } => self.register(email, full_name, organization).await,
            Command::Whoami => print_json(&self.api.auth().current_user().await?),
            Command::Status => self.status(),
            Command::Overview => self.overview().await,
            Command::Campaigns(command) => self.campaigns(command).await,
            Command::Creatives(command) => self.creatives(command).await,
            Command::Analytics(command) => self.analytics(command).await,
            Command::Ml(command) => self.ml(command).await,
            Command::Docs(command) => self.docs(command).await,
            Command::Chat(args) => self.chat(args).await,
            Command::Insights { campaign } => {
                print_json(&self.api.chat().quick_insights(campaign).await?)
            }
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Data commands are refused before any request when no token is stored.
    fn ensure_session(&self, command: &Command) -> Result<()> {
        if command.needs_session() && !self.session.is_authenticated() {
            return Err(SignInRequired.into());
        }
        Ok(())
    }

    async fn login(&mut self, email: Option<String>, password: Option<String>, remember: bool) -> Result<()> {
        let email = match email.or_else(|| self.config.last_email.clone()) {
            Some(email) => email,
            None => Self::prompt("Email: ")?,
        };
        if email.is_empty() {
            bail!("Email required");
        }

        let password = match password {
            Some(password) => password,
            None => match CredentialStore::get_password(&email) {
                Ok(stored) => {
                    info!("Using password remembered in keychain");
                    stored
                }
                Err(_) => rpassword::prompt_password("Password: ")?,
            },
        };

        let token = self
            .api
            .auth()
            .login(&LoginRequest {
                email: email.clone(),
                password: password.clone(),
            })
            .await?;
        self.session.set_token(&token.access_token)?;

        if remember {
            if !CredentialStore::is_persistent() {
                warn!("No OS keychain available; the password will not be remembered");
            }
            if let Err(e) = CredentialStore::store(&email, &password) {
                warn!(error = %e, "Failed to store credentials");
            }
        }

        self.config.last_email = Some(email.clone());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        info!("Login successful");
        println!("Signed in as {}", email);
        Ok(())
    }

    fn logout(&mut self, forget: bool) -> Result<()> {
        self.session.remove_token()?;

        if forget {
            if let Some(ref email) = self.config.last_email {
                CredentialStore::delete(email)?;
            }
        }

        println!("Signed out");
        Ok(())
    }

    async fn register(&self, email: String, full_name: String, organization: Option<String>) -> Result<()> {
        let password = rpassword::prompt_password("Password: ")?;
        let confirm = rpassword::prompt_password("Confirm password: ")?;
        if password != confirm {
            bail!("Passwords do not match");
        }

        let user = self
            .api
            .auth()
            .register(&RegisterRequest {
                email,
                password,
                full_name,
                organization_name: organization,
            })
            .await?;
        print_json(&user)
    }

    fn status(&self) -> Result<()> {
        println!("API: {}", self.api.base_url());
        if self.session.is_authenticated() {
            match self.session.load() {
                Ok(Some(data)) => println!(
                    "Signed in (token expires in {} days)",
                    data.days_until_expiry()
                ),
                _ => println!("Signed in"),
            }
        } else {
            println!("Not signed in");
        }
        if let Some(ref email) = self.config.last_email {
            let remembered = if CredentialStore::has_credentials(email) { " (password remembered)" } else { "" };
            println!("Last account: {}{}", email, remembered);
        }
        Ok(())
    }

    // =========================================================================
    // Data commands
    // =========================================================================

    /// Dashboard and campaigns are fetched concurrently.
    async fn overview(&self) -> Result<()> {
        let analytics = self.api.analytics();
        let campaigns = self.api.campaigns();
        let (dashboard, list) = futures::try_join!(analytics.dashboard(), campaigns.list(Page::default()))?;

        print_json(&dashboard)?;
        print!("{}", campaign_metrics_table(&list));
        Ok(())
    }

    async fn campaigns(&self, command: CampaignCommand) -> Result<()> {
        let campaigns = self.api.campaigns();
        match command {
            CampaignCommand::List { skip, limit, metrics } => {
                let list = campaigns.list(Page { skip, limit }).await?;
                if metrics {
                    print!("{}", campaign_metrics_table(&list));
                    Ok(())
                } else {
                    print_json(&list)
                }
            }
            CampaignCommand::Get { id } => print_json(&campaigns.get(id).await?),
            CampaignCommand::Create(args) => print_json(&campaigns.create(&new_campaign(args)?).await?),
            CampaignCommand::Delete { id, yes } => {
                if !yes && !Self::confirm(&format!("Delete campaign {}?", id))? {
                    println!("Cancelled");
                    return Ok(());
                }
                campaigns.delete(&id).await?;
                println!("Deleted campaign {}", id);
                Ok(())
            }
        }
    }

    async fn creatives(&self, command: CreativeCommand) -> Result<()> {
        let creatives = self.api.creatives();
        match command {
            CreativeCommand::Upload { campaign, file } => {
                let upload = FileUpload::from_path(&file).await?;
                print_json(&creatives.upload(campaign, upload).await?)
            }
            CreativeCommand::List { campaign } => print_json(&creatives.list(campaign).await?),
            CreativeCommand::Delete { id, yes } => {
                if !yes && !Self::confirm(&format!("Delete creative {}?", id))? {
                    println!("Cancelled");
                    return Ok(());
                }
                creatives.delete(&id).await?;
                println!("Deleted creative {}", id);
                Ok(())
            }
        }
    }

    async fn analytics(&self, command: AnalyticsCommand) -> Result<()> {
        let analytics = self.api.analytics();
        let response = match command {
            AnalyticsCommand::Dashboard => analytics.dashboard().await?,
            AnalyticsCommand::Roi { campaign } => analytics.roi_metrics(campaign).await?,
            AnalyticsCommand::Simulate { campaign, budget } => {
                analytics.budget_simulation(campaign, budget).await?
            }
        };
        print_json(&response)
    }

    async fn ml(&self, command: MlCommand) -> Result<()> {
        let ml = self.api.ml();
        match command {
            MlCommand::Predict { campaign } => print_json(&ml.predict_engagement(campaign).await?),
            MlCommand::Trust { creative } => {
                let response = ml.trust_score(creative).await?;
                if let Some(summary) = trust_summary(&response) {
                    println!("{}", summary);
                }
                print_json(&response)
            }
            MlCommand::Analyze { creative } => print_json(&ml.analyze_creative(creative).await?),
        }
    }

    async fn docs(&self, command: DocsCommand) -> Result<()> {
        let documents = self.api.documents();
        match command {
            DocsCommand::Upload { file } => {
                let upload = FileUpload::from_path(&file).await?;
                print_json(&documents.upload(upload).await?)
            }
            DocsCommand::List => print_json(&documents.list().await?),
            DocsCommand::Delete { id, yes } => {
                if !yes && !Self::confirm(&format!("Delete document {}?", id))? {
                    println!("Cancelled");
                    return Ok(());
                }
                documents.delete(&id).await?;
                println!("Deleted document {}", id);
                Ok(())
            }
            DocsCommand::Query { query, results } => print_json(&documents.query(&query, results).await?),
        }
    }

    async fn chat(&self, args: ChatArgs) -> Result<()> {
        let history = match args.history {
            Some(ref path) => load_history(path).await?,
            None => Vec::new(),
        };

        let reply = self
            .api
            .chat()
            .send_message(&args.message, !args.no_rag, &history)
            .await?;

        match reply.get("response").and_then(Value::as_str) {
            Some(text) => {
                println!("{}", text);
                if let Some(sources) = reply.get("sources").filter(|s| !s.is_null()) {
                    print_json(&json!({ "sources": sources }))?;
                }
                Ok(())
            }
            None => print_json(&reply),
        }
    }

    fn prompt(label: &str) -> Result<String> {
        print!("{}", label);
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn confirm(question: &str) -> Result<bool> {
        Ok(is_confirmed(&Self::prompt(&format!("{} [y/N] ", question))?))
    }
}

/// Only an explicit yes confirms; anything else, including no answer, declines.
fn is_confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn new_campaign(args: NewCampaignArgs) -> Result<NewCampaign> {
    let parse_date = |value: Option<String>| -> Result<Option<chrono::NaiveDate>> {
        value
            .map(|v| {
                chrono::NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                    .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", v))
            })
            .transpose()
    };

    Ok(NewCampaign {
        name: args.name,
        platform: args.platform,
        budget: args.budget,
        country: args.country,
        product_category: args.category,
        start_date: parse_date(args.start)?,
        end_date: parse_date(args.end)?,
    })
}

async fn load_history(path: &Path) -> Result<Vec<ChatTurn>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read chat history {}", path.display()))?;
    serde_json::from_str(&contents).context("Chat history must be a JSON array of {role, content}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(start: Option<&str>) -> NewCampaignArgs {
        NewCampaignArgs {
            name: "Spring Sale".into(),
            platform: "facebook".into(),
            budget: Some(10000.0),
            country: None,
            category: None,
            start: start.map(str::to_string),
            end: None,
        }
    }

    #[test]
    fn test_new_campaign_parses_dates() {
        let campaign = new_campaign(args(Some("2024-01-01"))).unwrap();
        assert_eq!(campaign.start_date, chrono::NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(campaign.end_date, None);
        assert_eq!(campaign.budget, Some(10000.0));
    }

    #[test]
    fn test_new_campaign_rejects_bad_date() {
        let err = new_campaign(args(Some("01/01/2024"))).unwrap_err();
        assert!(err.to_string().contains("expected YYYY-MM-DD"));
    }

    #[test]
    fn test_is_confirmed() {
        assert!(is_confirmed("y"));
        assert!(is_confirmed("YES"));
        assert!(is_confirmed(" Yes "));
        assert!(!is_confirmed(""));
        assert!(!is_confirmed("n"));
        assert!(!is_confirmed("yep"));
    }

    fn app_in(dir: &Path) -> App {
        let session = Arc::new(FileSessionStore::new(dir.join("advision")));
        App::with_session(Config::default(), session).unwrap()
    }

    #[tokio::test]
    async fn test_data_commands_require_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());

        let err = app.run(Command::Whoami).await.unwrap_err();
        assert!(err.is::<SignInRequired>());

        let err = app.run(Command::Docs(DocsCommand::List)).await.unwrap_err();
        assert!(err.is::<SignInRequired>());
        assert!(app.take_invalidation().is_none());
    }

    #[tokio::test]
    async fn test_session_commands_run_without_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());

        app.run(Command::Status).await.unwrap();
        app.run(Command::Logout { forget: false }).await.unwrap();
    }

    #[test]
    fn test_stored_token_passes_the_guard() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(dir.path());

        app.session.set_token("abc").unwrap();
        app.ensure_session(&Command::Overview).unwrap();

        app.session.remove_token().unwrap();
        assert!(app.ensure_session(&Command::Overview).is_err());
    }

    #[tokio::test]
    async fn test_load_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(
            &path,
            r#"[{"role": "user", "content": "Hi"}, {"role": "assistant", "content": "Hello"}]"#,
        )
        .unwrap();

        let history = load_history(&path).await.unwrap();
        assert_eq!(history, vec![ChatTurn::user("Hi"), ChatTurn::assistant("Hello")]);
    }

    #[tokio::test]
    async fn test_load_history_rejects_bad_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, r#"{"role": "user"}"#).unwrap();

        assert!(load_history(&path).await.is_err());
    }
}
