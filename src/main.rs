use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod derive;
mod diagnostics;
mod error;
mod plan;
mod propagate;
mod sheet;
mod view;

use plan::{
    IdPatterns, LinkSpec, NodeId, PlanGraph, ProgressStatus, ScheduleStatus, StatusDomain,
};
use sheet::PlanRow;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "loeviz")]
#[command(about = "Line of Effort plan graphs: validation, status derivation, display views", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a plan sheet (and optional links file) and print a summary.
    Check {
        /// Plan sheet CSV.
        #[arg(long)]
        sheet: String,

        /// Interdependency links JSON.
        #[arg(long)]
        links: Option<String>,

        /// Status vocabulary: schedule or progress.
        #[arg(long, default_value = "schedule")]
        mode: String,
    },
    /// Print the full model as JSON.
    Dump {
        #[arg(long)]
        sheet: String,

        #[arg(long)]
        links: Option<String>,

        #[arg(long, default_value = "schedule")]
        mode: String,

        /// Output file; stdout when omitted.
        #[arg(short = 'o', long)]
        out: Option<String>,
    },
    /// Extract a display subgraph for selected groups or selected nodes.
    View {
        #[arg(long)]
        sheet: String,

        #[arg(long)]
        links: Option<String>,

        #[arg(long, default_value = "schedule")]
        mode: String,

        /// Comma-separated group ids (whole-group scope).
        #[arg(long)]
        groups: Option<String>,

        /// Comma-separated node ids (immediate-network scope).
        #[arg(long)]
        nodes: Option<String>,

        #[arg(short = 'o', long)]
        out: Option<String>,
    },
    /// Recompute schedule statuses for today and write the sheet back.
    Derive {
        #[arg(long)]
        sheet: String,

        #[arg(long)]
        links: Option<String>,

        /// Evaluation date, YYYY-MM-DD; defaults to the local date.
        #[arg(long)]
        today: Option<String>,

        /// Destination; the sheet itself when omitted.
        #[arg(short = 'o', long)]
        out: Option<String>,
    },
    /// Apply one progress edit, propagate one hop, and print the new model.
    SetStatus {
        #[arg(long)]
        sheet: String,

        #[arg(long)]
        links: Option<String>,

        /// Node id to edit.
        #[arg(long)]
        node: String,

        /// New progress status (behind, on track, ahead, completed).
        #[arg(long)]
        status: String,

        #[arg(short = 'o', long)]
        out: Option<String>,
    },
    /// Print one node and its incident edges.
    Show {
        #[arg(long)]
        sheet: String,

        #[arg(long)]
        links: Option<String>,

        #[arg(long, default_value = "schedule")]
        mode: String,

        /// Node id to inspect.
        #[arg(long)]
        node: String,
    },
}

enum Mode {
    Schedule,
    Progress,
}

fn mode_of(text: &str) -> Result<Mode> {
    match text {
        "schedule" => Ok(Mode::Schedule),
        "progress" => Ok(Mode::Progress),
        other => bail!("unknown mode {other:?} (expected schedule or progress)"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Check { sheet, links, mode } => match mode_of(&mode)? {
            Mode::Schedule => run_check::<ScheduleStatus>(&sheet, links.as_deref()),
            Mode::Progress => run_check::<ProgressStatus>(&sheet, links.as_deref()),
        },
        Commands::Dump {
            sheet,
            links,
            mode,
            out,
        } => match mode_of(&mode)? {
            Mode::Schedule => run_dump::<ScheduleStatus>(&sheet, links.as_deref(), out.as_deref()),
            Mode::Progress => run_dump::<ProgressStatus>(&sheet, links.as_deref(), out.as_deref()),
        },
        Commands::View {
            sheet,
            links,
            mode,
            groups,
            nodes,
            out,
        } => match mode_of(&mode)? {
            Mode::Schedule => run_view::<ScheduleStatus>(
                &sheet,
                links.as_deref(),
                groups.as_deref(),
                nodes.as_deref(),
                out.as_deref(),
            ),
            Mode::Progress => run_view::<ProgressStatus>(
                &sheet,
                links.as_deref(),
                groups.as_deref(),
                nodes.as_deref(),
                out.as_deref(),
            ),
        },
        Commands::Derive {
            sheet,
            links,
            today,
            out,
        } => run_derive(&sheet, links.as_deref(), today.as_deref(), out.as_deref()),
        Commands::SetStatus {
            sheet,
            links,
            node,
            status,
            out,
        } => run_set_status(&sheet, links.as_deref(), &node, &status, out.as_deref()),
        Commands::Show {
            sheet,
            links,
            mode,
            node,
        } => match mode_of(&mode)? {
            Mode::Schedule => run_show::<ScheduleStatus>(&sheet, links.as_deref(), &node),
            Mode::Progress => run_show::<ProgressStatus>(&sheet, links.as_deref(), &node),
        },
    }
}

/// Load, validate, and build: the one path every command goes through.
fn load_graph<S: StatusDomain>(
    sheet_path: &str,
    links_path: Option<&str>,
) -> Result<(Vec<PlanRow<S>>, PlanGraph<S>)> {
    let text =
        std::fs::read_to_string(sheet_path).with_context(|| format!("read sheet {sheet_path}"))?;
    let raw = sheet::read_rows(&text)?;
    let patterns = IdPatterns::new()?;
    let rows = sheet::validate_rows::<S>(&patterns, &raw)?;
    let links = match links_path {
        Some(path) => {
            let text =
                std::fs::read_to_string(path).with_context(|| format!("read links {path}"))?;
            LinkSpec::parse(&text)?
        }
        None => LinkSpec::default(),
    };
    let graph = PlanGraph::build(&rows, &links)?;
    Ok((rows, graph))
}

fn emit(out: Option<&str>, payload: String) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, payload).with_context(|| format!("write {path}"))?;
            println!("Wrote {path}");
        }
        None => println!("{payload}"),
    }
    Ok(())
}

fn run_check<S: StatusDomain>(sheet_path: &str, links_path: Option<&str>) -> Result<()> {
    let (_, graph) = load_graph::<S>(sheet_path, links_path)?;
    let groups = graph.nodes().filter(|n| n.parent().is_none()).count();
    println!(
        "ok: {} nodes ({} groups), {} edges",
        graph.node_count(),
        groups,
        graph.edge_count()
    );
    Ok(())
}

fn run_dump<S: StatusDomain>(
    sheet_path: &str,
    links_path: Option<&str>,
    out: Option<&str>,
) -> Result<()> {
    let (_, graph) = load_graph::<S>(sheet_path, links_path)?;
    emit(out, serde_json::to_string_pretty(&view::full(&graph))?)
}

fn run_view<S: StatusDomain>(
    sheet_path: &str,
    links_path: Option<&str>,
    groups: Option<&str>,
    nodes: Option<&str>,
    out: Option<&str>,
) -> Result<()> {
    let (_, graph) = load_graph::<S>(sheet_path, links_path)?;
    let sub = match (groups, nodes) {
        (Some(groups), None) => view::group_filter(&graph, &selection(&graph, groups)),
        (None, Some(nodes)) => view::ego_filter(&graph, &selection(&graph, nodes)),
        _ => bail!("pass exactly one of --groups or --nodes"),
    };
    emit(out, serde_json::to_string_pretty(&sub)?)
}

/// Split a comma-separated selection and canonicalize it. Unknown ids only
/// warn; the filters ignore them.
fn selection<S: StatusDomain>(graph: &PlanGraph<S>, raw: &str) -> Vec<NodeId> {
    let mut picked = Vec::new();
    for token in raw.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let id = NodeId::canonical(token);
        if graph.node(&id).is_none() {
            diagnostics::warn(format!("selection id {id} is not in the model"));
        }
        picked.push(id);
    }
    picked
}

fn run_derive(
    sheet_path: &str,
    links_path: Option<&str>,
    today: Option<&str>,
    out: Option<&str>,
) -> Result<()> {
    let (rows, mut graph) = load_graph::<ScheduleStatus>(sheet_path, links_path)?;
    let today = match today {
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .with_context(|| format!("--today {text:?} is not a YYYY-MM-DD date"))?,
        None => chrono::Local::now().date_naive(),
    };

    let changes = derive::derive_schedule(&mut graph, today);
    for change in &changes {
        diagnostics::note(format!(
            "{}: {} -> {}",
            change.id,
            change.from.label(),
            change.to.label()
        ));
    }

    let rendered = sheet::render_sheet(&rows, &graph)?;
    let dest = out.unwrap_or(sheet_path);
    std::fs::write(dest, rendered).with_context(|| format!("write sheet {dest}"))?;
    println!("{} status change(s); wrote {dest}", changes.len());
    Ok(())
}

fn run_set_status(
    sheet_path: &str,
    links_path: Option<&str>,
    node: &str,
    status: &str,
    out: Option<&str>,
) -> Result<()> {
    let (_, mut graph) = load_graph::<ProgressStatus>(sheet_path, links_path)?;
    let id = NodeId::canonical(node);
    let Some(status) = ProgressStatus::parse(status) else {
        bail!(
            "status {status:?} is not one of [{}]",
            ProgressStatus::LABELS.join(", ")
        );
    };

    let changes = propagate::apply_status_edit(&mut graph, &id, status)?;
    for change in &changes {
        diagnostics::note(format!(
            "{}: {} -> {}",
            change.id,
            change.from.label(),
            change.to.label()
        ));
    }

    emit(out, serde_json::to_string_pretty(&view::full(&graph))?)
}

fn run_show<S: StatusDomain>(sheet_path: &str, links_path: Option<&str>, node: &str) -> Result<()> {
    let (_, graph) = load_graph::<S>(sheet_path, links_path)?;
    let id = NodeId::canonical(node);
    let Some(detail) = view::node_detail(&graph, &id) else {
        bail!("no node {id} in the model");
    };
    println!("{}", serde_json::to_string_pretty(&detail)?);
    Ok(())
}
