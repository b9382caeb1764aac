use crate::adapters::http::HttpTransport;
use crate::adapters::storage::LocalStateStore;
use crate::config::cli::{Command, FormArgs, ListArgs, ThemeCommand};
use crate::config::AppSettings;
use crate::core::admin::EntityPage;
use crate::core::auth::{self, AuthenticatedTransport};
use crate::core::form::FormInput;
use crate::core::preferences::{load_preferences, toggle_dark_mode};
use crate::core::session::SessionContext;
use crate::core::table::{self, TableStyle};
use crate::domain::model::{ListQuery, MAX_PAGE_SIZE};
use crate::domain::ports::Transport;
use crate::domain::resources::RESOURCES;
use crate::utils::error::Result;
use crate::utils::validation::{validate_range, validate_required_field};
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;

/// Wires the session, transports and state directory together and runs
/// one command against them.
pub struct AdminApp {
    settings: AppSettings,
    store: LocalStateStore,
    session: SessionContext<LocalStateStore>,
    /// Unauthenticated transport, used for login.
    http: Arc<dyn Transport>,
    /// Bearer-token transport with refresh-and-retry, used for everything else.
    api: Arc<dyn Transport>,
}

impl AdminApp {
    pub async fn bootstrap(settings: AppSettings) -> Result<Self> {
        let store = LocalStateStore::new(&settings.state_dir);
        let session = SessionContext::hydrate(store.clone()).await?;
        let http: Arc<dyn Transport> =
            Arc::new(HttpTransport::new(&settings.base_url, settings.timeout())?);
        let api: Arc<dyn Transport> = Arc::new(AuthenticatedTransport::new(
            Arc::clone(&http),
            session.clone(),
        ));

        tracing::debug!(
            "Admin client ready (api: {}, state: {})",
            settings.base_url,
            store.base_path().display()
        );

        Ok(Self {
            settings,
            store,
            session,
            http,
            api,
        })
    }

    pub fn session(&self) -> &SessionContext<LocalStateStore> {
        &self.session
    }

    pub async fn execute<W: Write>(&self, command: Command, out: &mut W) -> Result<()> {
        match command {
            Command::Login { login, password } => {
                let password = validate_required_field("password", &password)?;
                let user = auth::login(self.http.as_ref(), &self.session, &login, password).await?;
                writeln!(out, "✅ Logged in as {} (id: {})", login, user.id)?;
            }
            Command::Logout => {
                auth::logout(&self.session).await?;
                writeln!(out, "👋 Logged out")?;
            }
            Command::Whoami => self.whoami(out).await?,
            Command::Resources => Self::resources(out)?,
            Command::Theme { action } => self.theme(action, out).await?,
            Command::List(args) => self.list(args, out).await?,
            Command::Add { resource, form } => {
                let mut page = self.open(&resource).await?;
                let created = page.add(&parse_form(&form)?).await?;
                writeln!(
                    out,
                    "✅ {} created{}",
                    page.spec().title,
                    id_suffix(&created)
                )?;
            }
            Command::Edit { resource, id, form } => {
                let mut page = self.open(&resource).await?;
                page.edit(&id, &parse_form(&form)?).await?;
                writeln!(out, "✅ {} {} updated", page.spec().title, id)?;
            }
            Command::Delete { resource, id } => {
                let mut page = self.open(&resource).await?;
                page.delete(&id).await?;
                writeln!(out, "🗑️ {} {} deleted", page.spec().title, id)?;
            }
        }
        Ok(())
    }

    async fn open(&self, resource: &str) -> Result<EntityPage> {
        let page = EntityPage::open(resource, Arc::clone(&self.api))?;
        auth::require_session(&self.session).await?;
        Ok(page)
    }

    async fn whoami<W: Write>(&self, out: &mut W) -> Result<()> {
        let session = self.session.snapshot().await;
        match (&session.user, session.is_authenticated()) {
            (Some(user), true) => {
                let name = user.name.as_deref().unwrap_or("-");
                writeln!(out, "Logged in as {} (id: {})", name, user.id)?;
            }
            (None, true) => writeln!(out, "Logged in (no user details stored)")?,
            (_, false) => writeln!(out, "Not logged in")?,
        }
        writeln!(
            out,
            "access token: {}, refresh token: {}",
            presence(session.access_token.as_deref()),
            presence(session.refresh_token.as_deref())
        )?;
        Ok(())
    }

    fn resources<W: Write>(out: &mut W) -> Result<()> {
        let width = RESOURCES.iter().map(|r| r.name.len()).max().unwrap_or(0);
        for resource in RESOURCES {
            writeln!(
                out,
                "{:<width$}  {:<20}  search: {:<8}  {}",
                resource.name,
                resource.path,
                resource.search_param,
                if resource.is_multipart() {
                    "multipart"
                } else {
                    "json"
                },
                width = width
            )?;
        }
        Ok(())
    }

    async fn theme<W: Write>(&self, action: ThemeCommand, out: &mut W) -> Result<()> {
        let preferences = match action {
            ThemeCommand::Show => load_preferences(&self.store).await?,
            ThemeCommand::Toggle => toggle_dark_mode(&self.store).await?,
        };
        writeln!(
            out,
            "Dark mode: {}",
            if preferences.dark_mode { "on" } else { "off" }
        )?;
        Ok(())
    }

    async fn list<W: Write>(&self, args: ListArgs, out: &mut W) -> Result<()> {
        let mut page = self.open(&args.resource).await?;
        let limit = args.limit.unwrap_or(self.settings.default_page_size);
        validate_range("limit", limit, 1, MAX_PAGE_SIZE)?;
        let query = ListQuery::new(args.page, limit)
        .with_search(args.search)
        .at_page(args.page);

        let style = TableStyle::from_preferences(&load_preferences(&self.store).await?);
        let spec = page.spec();
        let records = page.list(query).await?;
        let rendered = table::render(spec, records, args.format, style)?;
        write!(out, "{}", rendered)?;
        if !rendered.ends_with('\n') {
            writeln!(out)?;
        }
        Ok(())
    }
}

fn parse_form(form: &FormArgs) -> Result<FormInput> {
    FormInput::parse(&form.fields, &form.files)
}

fn presence(token: Option<&str>) -> &'static str {
    match token {
        Some(t) if !t.is_empty() => "present",
        _ => "missing",
    }
}

fn id_suffix(created: &Value) -> String {
    match created.get("id").or_else(|| created.pointer("/data/id")) {
        Some(Value::String(id)) => format!(" (id: {})", id),
        Some(Value::Number(id)) => format!(" (id: {})", id),
        _ => String::new(),
    }
}
