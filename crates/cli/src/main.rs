use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::{error, info};

use hrdeck_api::{EmployeeUpdate, Gateway, Session, StatusAction};
use hrdeck_core::kinds::ResourceKind;
use hrdeck_core::{display_value, Record, SortDirection};
use hrdeck_gateway::HttpGateway;
use hrdeck_table::TableController;

mod confirm;
mod nav;

use confirm::{AlwaysYes, Confirm, StdinConfirm};

#[derive(Parser, Debug)]
#[command(name = "hrdeckctl", version, about = "hrdeck CLI for the HR administration API")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value = "human")]
    output: Output,

    /// Base URL of the HR API
    #[arg(long = "api-url", env = "HRDECK_API_URL", global = true, default_value = "http://localhost:5000/api")]
    api_url: String,

    /// Bearer token obtained from `login`
    #[arg(long = "token", env = "HRDECK_TOKEN", global = true)]
    token: Option<String>,

    /// Acting employee id (scopes per-employee listings)
    #[arg(long = "employee", env = "HRDECK_EMPLOYEE_ID", global = true)]
    employee: Option<i64>,

    /// Answer yes to confirmation prompts
    #[arg(long = "yes", global = true, action = ArgAction::SetTrue)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output {
    Human,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum KindArg {
    Employees,
    Permissions,
    Advances,
    Expenses,
}

impl From<KindArg> for ResourceKind {
    fn from(k: KindArg) -> ResourceKind {
        match k {
            KindArg::Employees => ResourceKind::Employees,
            KindArg::Permissions => ResourceKind::Permissions,
            KindArg::Advances => ResourceKind::Advances,
            KindArg::Expenses => ResourceKind::Expenses,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and print the session token
    Login { email: String, password: String },
    /// Ask the API to send a password reset mail
    ResetPassword { email: String },
    /// Change the account password
    ChangePassword {
        email: String,
        password: String,
        repeat_password: String,
    },
    /// List a collection with sort/filter/pagination
    Ls {
        kind: KindArg,
        /// Only records owned by --employee
        #[arg(long = "mine", action = ArgAction::SetTrue)]
        mine: bool,
        /// Sortable column to order by
        #[arg(long = "sort")]
        sort: Option<String>,
        /// Sort descending instead of ascending
        #[arg(long = "desc", action = ArgAction::SetTrue)]
        desc: bool,
        /// Exact-match filter on the kind's designated field ("all" disables)
        #[arg(long = "filter")]
        filter: Option<String>,
        /// 1-based page number
        #[arg(long = "page", default_value_t = 1)]
        page: usize,
        #[arg(long = "page-size")]
        page_size: Option<usize>,
    },
    /// Approve a pending request
    Approve { kind: KindArg, id: i64 },
    /// Reject a pending request
    Reject {
        kind: KindArg,
        id: i64,
        #[arg(long = "reason")]
        reason: Option<String>,
    },
    /// Create a record from key=value fields (values may be JSON)
    Create {
        kind: KindArg,
        fields: Vec<String>,
    },
    /// Update an employee's own profile fields
    UpdateEmployee {
        id: i64,
        #[arg(long = "phone")]
        phone: String,
        #[arg(long = "address")]
        address: String,
        #[arg(long = "image")]
        image: Option<String>,
    },
    /// Upload a supporting document
    Upload { path: PathBuf },
    /// Download a supporting document
    Download {
        file_name: String,
        #[arg(long = "out")]
        out: Option<PathBuf>,
    },
    /// Print the dashboard navigation tree
    Menu,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("HRDECK_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("HRDECK_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => tracing::info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            tracing::warn!(addr = %addr, "invalid HRDECK_METRICS_ADDR; expected host:port");
        }
    }
}

fn session_from(cli: &Cli) -> Session {
    let mut session = Session::new(cli.api_url.clone());
    session.token = cli.token.clone();
    session.employee_id = cli.employee;
    session
}

/// Parse `key=value` arguments; values that parse as JSON keep their type,
/// everything else stays a string.
fn parse_field_args(fields: &[String]) -> Result<Record> {
    let mut rec = Record::new();
    for raw in fields {
        let Some((key, value)) = raw.split_once('=') else {
            bail!("expected key=value, got '{}'", raw);
        };
        let parsed = serde_json::from_str::<serde_json::Value>(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        rec.insert(key.to_string(), parsed);
    }
    Ok(rec)
}

fn create_rules_for(kind: ResourceKind) -> &'static [hrdeck_forms::Rule] {
    match kind {
        ResourceKind::Employees => hrdeck_forms::employee_create_rules(),
        ResourceKind::Permissions => hrdeck_forms::permission_request_rules(),
        ResourceKind::Advances => hrdeck_forms::advance_request_rules(),
        ResourceKind::Expenses => hrdeck_forms::expense_claim_rules(),
    }
}

fn pad(s: &str, width: usize) -> String {
    let mut s = s.to_string();
    if s.chars().count() > width {
        s = s.chars().take(width.saturating_sub(1)).collect::<String>() + "…";
    }
    format!("{:<width$}", s, width = width)
}

fn print_table(kind: ResourceKind, view: &hrdeck_table::ViewState) {
    let spec = kind.table_spec();
    let header: Vec<String> = spec
        .columns
        .iter()
        .map(|c| pad(c.label, c.width))
        .collect();
    println!("{}", header.join(" "));
    for rec in &view.page {
        let row: Vec<String> = spec
            .columns
            .iter()
            .map(|c| pad(&display_value(rec, c.field), c.width))
            .collect();
        println!("{}", row.join(" "));
    }
    println!(
        "page {}/{} ({} records)",
        view.page_index, view.page_count, view.total_filtered
    );
}

async fn run_ls(
    gateway: Arc<dyn Gateway>,
    cli: &Cli,
    kind: ResourceKind,
    mine: bool,
    sort: Option<String>,
    desc: bool,
    filter: Option<String>,
    page: usize,
    page_size: Option<usize>,
) -> Result<()> {
    let scope = if mine {
        let id = cli
            .employee
            .context("--mine requires --employee (or HRDECK_EMPLOYEE_ID)")?;
        Some(id.to_string())
    } else {
        None
    };
    let mut ctl = TableController::new(gateway, kind);
    if let Some(n) = page_size {
        ctl = ctl.with_page_size(n);
    }
    ctl.load(scope.as_deref()).await?;
    if let Some(field) = sort {
        ctl.sort_by(&field)?;
        if desc {
            ctl.sort_by(&field)?;
        }
    }
    match filter.as_deref() {
        None | Some("all") | Some("") => {}
        Some(v) => ctl.set_filter(Some(v.to_string())),
    }
    ctl.paginate(page);
    let view = ctl.view();
    match cli.output {
        Output::Human => print_table(kind, &view),
        Output::Json => {
            let sort = ctl
                .sort_key()
                .map(|k| (k.to_string(), ctl.sort_direction()));
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "page": view.page,
                    "pageIndex": view.page_index,
                    "pageCount": view.page_count,
                    "totalFiltered": view.total_filtered,
                    "sort": sort.map(|(k, d)| serde_json::json!({
                        "field": k,
                        "descending": d == SortDirection::Descending,
                    })),
                    "filter": ctl.filter(),
                }))?
            );
        }
    }
    Ok(())
}

async fn run_decision(
    gateway: Arc<dyn Gateway>,
    cli: &Cli,
    kind: ResourceKind,
    id: i64,
    action: StatusAction,
) -> Result<()> {
    let verb = if action.approve { "approve" } else { "reject" };
    let asker: Box<dyn Confirm> = if cli.yes {
        Box::new(AlwaysYes)
    } else {
        Box::new(StdinConfirm)
    };
    let prompt = format!("{} {} #{}?", verb, kind.name().trim_end_matches('s'), id);
    if !asker.confirm(&prompt)? {
        println!("aborted");
        return Ok(());
    }
    let mut ctl = TableController::new(gateway, kind);
    ctl.load(None).await?;
    let outcome = ctl.mutate(id, &action).await?;
    if outcome.success {
        info!(kind = kind.name(), id, verb, "decision applied");
        println!("{}", if outcome.message.is_empty() { "ok" } else { &outcome.message });
    } else {
        error!(kind = kind.name(), id, verb, message = %outcome.message, "decision rejected by API");
        eprintln!("failed: {}", outcome.message);
        std::process::exit(1);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();
    let gateway: Arc<dyn Gateway> = Arc::new(HttpGateway::new(session_from(&cli)));

    match &cli.command {
        Commands::Login { email, password } => {
            let resp = gateway.login(email, password).await?;
            match cli.output {
                Output::Human => {
                    if let Some(token) = &resp.token {
                        println!("export HRDECK_TOKEN={}", token);
                    }
                    if let Some(id) = resp.employee_id {
                        println!("export HRDECK_EMPLOYEE_ID={}", id);
                    }
                    if let Some(msg) = &resp.message {
                        eprintln!("{}", msg);
                    }
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&resp)?),
            }
        }
        Commands::ResetPassword { email } => {
            let known = gateway.request_password_reset(email).await?;
            if known {
                println!("reset mail sent to {}", email);
            } else {
                eprintln!("no account for {}", email);
                std::process::exit(1);
            }
        }
        Commands::ChangePassword {
            email,
            password,
            repeat_password,
        } => {
            if let Err(msg) = hrdeck_forms::validate_password_change(password, repeat_password) {
                bail!("{}", msg);
            }
            let outcome = gateway
                .change_password(email, password, repeat_password)
                .await?;
            if outcome.success {
                println!("password changed");
            } else {
                eprintln!("failed: {}", outcome.message);
                std::process::exit(1);
            }
        }
        Commands::Ls {
            kind,
            mine,
            sort,
            desc,
            filter,
            page,
            page_size,
        } => {
            run_ls(
                gateway,
                &cli,
                (*kind).into(),
                *mine,
                sort.clone(),
                *desc,
                filter.clone(),
                *page,
                *page_size,
            )
            .await?;
        }
        Commands::Approve { kind, id } => {
            run_decision(gateway, &cli, (*kind).into(), *id, StatusAction::approve()).await?;
        }
        Commands::Reject { kind, id, reason } => {
            run_decision(
                gateway,
                &cli,
                (*kind).into(),
                *id,
                StatusAction::reject(reason.clone()),
            )
            .await?;
        }
        Commands::Create { kind, fields } => {
            let kind: ResourceKind = (*kind).into();
            let record = parse_field_args(fields)?;
            let violations = hrdeck_forms::validate(create_rules_for(kind), &record);
            if !violations.is_empty() {
                for v in &violations {
                    eprintln!("{}: {}", v.field, v.message);
                }
                std::process::exit(1);
            }
            let created = gateway.create_record(kind, record).await?;
            match cli.output {
                Output::Human => println!("created"),
                Output::Json => println!("{}", serde_json::to_string_pretty(&created)?),
            }
        }
        Commands::UpdateEmployee {
            id,
            phone,
            address,
            image,
        } => {
            let update = EmployeeUpdate {
                id: *id,
                phone_number: phone.clone(),
                address: address.clone(),
                image_path: image.clone(),
            };
            let outcome = gateway.update_employee(&update).await?;
            if outcome.success {
                println!("updated employee {}", id);
            } else {
                eprintln!("failed: {}", outcome.message);
                std::process::exit(1);
            }
        }
        Commands::Upload { path } => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .context("file name is not valid UTF-8")?;
            let stored = gateway.upload_file(name, bytes).await?;
            println!("{}", stored);
        }
        Commands::Download { file_name, out } => {
            let bytes = gateway.fetch_file(file_name).await?;
            let target = out.clone().unwrap_or_else(|| PathBuf::from(file_name));
            tokio::fs::write(&target, &bytes)
                .await
                .with_context(|| format!("writing {}", target.display()))?;
            println!("saved {} ({} bytes)", target.display(), bytes.len());
        }
        Commands::Menu => {
            let menu = nav::dashboard_menu();
            match cli.output {
                Output::Human => {
                    let mut out = String::new();
                    nav::render(&menu, 0, &mut out);
                    print!("{}", out);
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&menu)?),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_args_keep_json_types() {
        let rec = parse_field_args(&[
            "amount=1250.5".to_string(),
            "currency=TRY".to_string(),
            "approved=false".to_string(),
        ])
        .expect("parse");
        assert_eq!(rec["amount"], serde_json::json!(1250.5));
        assert_eq!(rec["currency"], serde_json::json!("TRY"));
        assert_eq!(rec["approved"], serde_json::json!(false));
    }

    #[test]
    fn field_args_without_equals_fail() {
        assert!(parse_field_args(&["oops".to_string()]).is_err());
    }

    #[test]
    fn pad_truncates_wide_values() {
        assert_eq!(pad("abc", 5), "abc  ");
        assert_eq!(pad("abcdefgh", 5), "abcd…");
    }
}
