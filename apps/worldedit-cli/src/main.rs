use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use glam::Vec3;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use worldedit_author::snapshot::serialize_objects;
use worldedit_author::{CreateObjectCommand, Editor, HeadlessHost, SceneHost};
use worldedit_common::{Params, Transform};
use worldedit_kernel::ObjectKey;
use worldedit_persist::{LoadReport, MapDocument, load_from_path, save_to_path};
use worldedit_tools::{DEFAULT_TIMELINE_LEN, HistoryTimeline, SceneInspector};

#[derive(Parser)]
#[command(name = "worldedit-cli", about = "CLI tool for world map documents")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize the objects in a map
    Info {
        /// Map document to read
        map: PathBuf,
    },
    /// List the most recent edits recorded in a map
    History {
        /// Map document to read
        map: PathBuf,
        /// Number of entries to show
        #[arg(short, long, default_value_t = DEFAULT_TIMELINE_LEN)]
        limit: usize,
    },
    /// Load a map into a headless scene and report anything dropped
    Validate {
        /// Map document to read
        map: PathBuf,
    },
    /// Run a scripted editing session and save the result
    Demo {
        /// Where to write the map document
        #[arg(short, long, default_value = "demo-map.json")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info { map } => {
            let (doc, host, report) = load(&map)?;
            println!("worldedit-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("map: {} (v{}, sha256 {})", map.display(), doc.version, doc.digest()?);
            print!("{}", SceneInspector::summary(host.scene()));
            println!("history: {} entries", report.history.undo_count());
        }
        Commands::History { map, limit } => {
            let (_, _, report) = load(&map)?;
            print!("{}", HistoryTimeline::recent(&report.history, limit));
        }
        Commands::Validate { map } => {
            let (_, _, report) = load(&map)?;
            println!(
                "objects: {} loaded, {} skipped",
                report.objects.len(),
                report.skipped_objects
            );
            println!(
                "history: {} restored, {} dropped",
                report.history.undo_count(),
                report.dropped_history
            );
            if let Some(warning) = &report.warning {
                println!("warning: {warning}");
            }
            if !report.is_clean() {
                bail!("{} did not load cleanly", map.display());
            }
            println!("OK");
        }
        Commands::Demo { out } => {
            let (host, editor) = demo_session();
            let doc = MapDocument::capture(host.scene(), editor.history());
            save_to_path(&doc, &out).with_context(|| format!("writing {}", out.display()))?;
            print!("{}", SceneInspector::summary(host.scene()));
            print!("{}", HistoryTimeline::recent(editor.history(), DEFAULT_TIMELINE_LEN));
            println!("saved {}", out.display());
        }
    }

    Ok(())
}

fn load(path: &Path) -> anyhow::Result<(MapDocument, HeadlessHost, LoadReport)> {
    let doc = load_from_path(path).with_context(|| format!("reading {}", path.display()))?;
    let mut host = HeadlessHost::with_builtins();
    let report = doc.restore(&mut host);
    Ok((doc, host, report))
}

/// Place a few objects, move, paste, edit a path, delete and undo.
fn demo_session() -> (HeadlessHost, Editor) {
    let mut host = HeadlessHost::with_builtins();
    let mut editor = Editor::default();

    let placed: Vec<ObjectKey> = [
        ("house", Vec3::new(0.0, 0.0, 0.0)),
        ("tree", Vec3::new(6.0, 0.0, 2.0)),
        ("bench", Vec3::new(4.0, 0.0, -3.0)),
        ("car", Vec3::new(-10.0, 0.0, 0.0)),
    ]
    .into_iter()
    .filter_map(|(kind, at)| place(&mut host, kind, at))
    .collect();
    let data = serialize_objects(host.scene(), &placed);
    editor.record(CreateObjectCommand::new(data, placed.clone()).with_description("Place objects"));

    let &[house, tree, bench, car] = placed.as_slice() else {
        info!("factory refused a demo object, stopping early");
        return (host, editor);
    };

    editor.select(&mut host, Some(tree), false);
    if editor.begin_transform(&host) {
        host.scene_mut()
            .set_transform(tree, Transform::from_position(Vec3::new(10.0, 5.0, 0.0)));
        editor.tick(&mut host);
        editor.commit_transform(&mut host);
    }

    editor.select(&mut host, Some(bench), true);
    editor.copy(&host);
    editor.paste(&mut host);

    editor.set_property(&mut host, house, "floors", 3.into());

    editor.select(&mut host, Some(car), false);
    for _ in 0..3 {
        editor.add_waypoint(&mut host);
    }
    editor.select(&mut host, Some(car), false);
    editor.remove_waypoint(&mut host);

    editor.select(&mut host, Some(bench), false);
    editor.delete_selected(&mut host);
    editor.undo(&mut host);

    (host, editor)
}

fn place(host: &mut HeadlessHost, kind: &str, at: Vec3) -> Option<ObjectKey> {
    let mut params = Params::new();
    params.insert("x".into(), json!(at.x));
    params.insert("y".into(), json!(at.y));
    params.insert("z".into(), json!(at.z));
    host.create(kind, &params)
}
