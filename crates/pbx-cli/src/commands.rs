use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use pbx_objects::{ConfigurationList, Isa};
use pbx_project::{CodecOptions, ProjectGraph};
use pbx_types::Identifier;
use serde::Serialize;
use similar::TextDiff;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let options = load_options(cli.config.as_deref())?;
    match cli.command {
        Command::Fmt(args) => cmd_fmt(args, &options),
        Command::Check(args) => cmd_check(args, &options, cli.format),
        Command::List(args) => cmd_list(args, &options, cli.format),
        Command::Targets(args) => cmd_targets(args, &options, cli.format),
    }
}

fn load_options(path: Option<&Path>) -> anyhow::Result<CodecOptions> {
    let Some(path) = path else {
        return Ok(CodecOptions::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let options: CodecOptions =
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
    debug!(?options, "loaded codec options");
    Ok(options)
}

/// Accept either the project file or the `.xcodeproj` bundle holding it.
fn project_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join("project.pbxproj")
    } else {
        path.to_path_buf()
    }
}

/// `Foo` for `.../Foo.xcodeproj/project.pbxproj`.
fn project_name(file: &Path) -> Option<String> {
    let bundle = file.parent()?;
    if bundle.extension()? != "xcodeproj" {
        return None;
    }
    Some(bundle.file_stem()?.to_string_lossy().into_owned())
}

struct Loaded {
    file: PathBuf,
    bytes: Vec<u8>,
    graph: ProjectGraph,
}

fn load(path: &Path, options: &CodecOptions) -> anyhow::Result<Loaded> {
    let file = project_file(path);
    let bytes = fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
    let mut graph = pbx_project::parse_with(&bytes, options)
        .with_context(|| format!("parsing {}", file.display()))?;
    if graph.project()?.name.is_empty() {
        if let Some(name) = project_name(&file) {
            graph.set_project_name(name)?;
        }
    }
    Ok(Loaded { file, bytes, graph })
}

fn write_atomically(file: &Path, contents: &[u8]) -> anyhow::Result<()> {
    let dir = match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;
    tmp.write_all(contents)?;
    tmp.persist(file)
        .with_context(|| format!("replacing {}", file.display()))?;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// fmt
// ---------------------------------------------------------------------------

fn cmd_fmt(args: FmtArgs, options: &CodecOptions) -> anyhow::Result<()> {
    let Loaded { file, bytes, graph } = load(&args.path, options)?;
    let formatted = pbx_project::serialize_with(&graph, options)?;
    let unchanged = formatted == bytes;

    if args.check {
        if unchanged {
            println!("{} {} is canonical", "✓".green(), file.display());
            return Ok(());
        }
        let before = String::from_utf8_lossy(&bytes);
        let after = String::from_utf8_lossy(&formatted);
        let name = file.display().to_string();
        let diff = TextDiff::from_lines(before.as_ref(), after.as_ref());
        print!("{}", diff.unified_diff().header(&name, &name));
        bail!("{} is not canonical", file.display());
    }

    if args.in_place {
        if unchanged {
            println!("{} unchanged", file.display());
        } else {
            write_atomically(&file, &formatted)?;
            println!("{} formatted {}", "✓".green(), file.display().to_string().bold());
        }
        return Ok(());
    }

    std::io::stdout().write_all(&formatted)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DanglingRow<'a> {
    owner: &'a Identifier,
    owner_isa: Option<Isa>,
    missing: &'a Identifier,
}

#[derive(Serialize)]
struct CheckReport<'a> {
    file: String,
    objects: usize,
    dangling: Vec<DanglingRow<'a>>,
}

fn cmd_check(args: CheckArgs, options: &CodecOptions, format: OutputFormat) -> anyhow::Result<()> {
    let Loaded { file, graph, .. } = load(&args.path, options)?;
    let store = graph.store();
    let dangling = store.dangling_references();
    let report = CheckReport {
        file: file.display().to_string(),
        objects: store.len(),
        dangling: dangling
            .iter()
            .map(|(owner, missing)| DanglingRow {
                owner,
                owner_isa: store.get(owner).ok().map(|e| e.isa()),
                missing,
            })
            .collect(),
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => {
            for row in &report.dangling {
                let isa = row.owner_isa.map(|i| i.as_str()).unwrap_or("?");
                println!(
                    "{} {} ({}) references missing {}",
                    "✗".red(),
                    row.owner.as_str().yellow(),
                    isa,
                    row.missing.as_str().red()
                );
            }
            if report.dangling.is_empty() {
                println!(
                    "{} {}: {} objects, no dangling references",
                    "✓".green().bold(),
                    report.file,
                    report.objects
                );
            }
        }
    }

    if !report.dangling.is_empty() {
        bail!("{} dangling reference(s) in {}", report.dangling.len(), report.file);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ObjectRow<'a> {
    id: &'a Identifier,
    isa: Isa,
    name: Option<String>,
}

fn cmd_list(args: ListArgs, options: &CodecOptions, format: OutputFormat) -> anyhow::Result<()> {
    let filter = args
        .isa
        .as_deref()
        .map(str::parse::<Isa>)
        .transpose()
        .map_err(anyhow::Error::msg)?;
    let Loaded { graph, .. } = load(&args.path, options)?;
    let entities = match filter {
        Some(isa) => graph.store().entities_of_kind(isa),
        None => graph.store().entities_in_order(),
    };
    let rows: Vec<ObjectRow<'_>> = entities
        .iter()
        .map(|e| ObjectRow {
            id: e.reference(),
            isa: e.isa(),
            name: e.display_name(),
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Text => {
            for row in &rows {
                println!(
                    "{}  {:<26} {}",
                    row.id.as_str().yellow(),
                    row.isa.as_str().cyan(),
                    row.name.as_deref().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// targets
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct TargetRow<'a> {
    id: &'a Identifier,
    isa: Isa,
    name: &'a str,
    product_type: Option<&'a str>,
    phases: Vec<String>,
    configurations: Vec<String>,
}

fn target_rows(graph: &ProjectGraph) -> anyhow::Result<Vec<TargetRow<'_>>> {
    let mut rows = Vec::new();
    for entity in graph.targets()? {
        let base = entity
            .target()
            .with_context(|| format!("{} is listed as a target but is {}", entity.reference(), entity.isa()))?;
        let phases = graph
            .resolve(&base.build_phases)?
            .iter()
            .filter_map(|p| p.display_name())
            .collect();
        let configurations = match &base.build_configuration_list {
            Some(list) => {
                let list = graph.store().get_as::<ConfigurationList>(list)?;
                graph
                    .resolve(&list.build_configurations)?
                    .iter()
                    .filter_map(|c| c.display_name())
                    .collect()
            }
            None => Vec::new(),
        };
        rows.push(TargetRow {
            id: entity.reference(),
            isa: entity.isa(),
            name: &base.name,
            product_type: base.product_type.as_ref().map(|p| p.as_str()),
            phases,
            configurations,
        });
    }
    Ok(rows)
}

fn cmd_targets(args: TargetsArgs, options: &CodecOptions, format: OutputFormat) -> anyhow::Result<()> {
    let Loaded { graph, .. } = load(&args.path, options)?;
    let rows = target_rows(&graph)?;

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Text => {
            for row in &rows {
                println!(
                    "{} ({}) {}",
                    row.name.bold(),
                    row.isa,
                    row.product_type.unwrap_or("").dimmed()
                );
                println!("  phases: {}", row.phases.join(", "));
                println!("  configurations: {}", row.configurations.join(", "));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = include_str!("../../pbx-project/fixtures/Demo.pbxproj");

    #[test]
    fn project_name_comes_from_bundle() {
        assert_eq!(
            project_name(Path::new("work/App.xcodeproj/project.pbxproj")).as_deref(),
            Some("App")
        );
        assert_eq!(project_name(Path::new("work/project.pbxproj")), None);
    }

    #[test]
    fn bundle_directory_resolves_to_project_file() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("App.xcodeproj");
        fs::create_dir(&bundle).unwrap();
        assert_eq!(project_file(&bundle), bundle.join("project.pbxproj"));
        let file = bundle.join("project.pbxproj");
        assert_eq!(project_file(&file), file);
    }

    #[test]
    fn options_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pbx.toml");
        fs::write(&path, "unknown_kinds = \"skip\"\nvalidate_references = false\n").unwrap();
        let options = load_options(Some(&path)).unwrap();
        assert_eq!(options.unknown_kinds, pbx_project::UnknownKindPolicy::Skip);
        assert!(!options.validate_references);
        assert_eq!(load_options(None).unwrap(), CodecOptions::default());
    }

    #[test]
    fn bad_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pbx.toml");
        fs::write(&path, "unknown_kinds = \"explode\"\n").unwrap();
        assert!(load_options(Some(&path)).is_err());
    }

    #[test]
    fn load_and_rewrite_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("Demo.xcodeproj");
        fs::create_dir(&bundle).unwrap();
        let file = bundle.join("project.pbxproj");
        let messy: Vec<&str> = FIXTURE.lines().map(|l| l.trim_start_matches('\t')).collect();
        let messy = messy.join("\n");
        fs::write(&file, &messy).unwrap();

        let loaded = load(&bundle, &CodecOptions::default()).unwrap();
        assert_eq!(loaded.graph.project().unwrap().name, "Demo");
        let formatted = pbx_project::serialize(&loaded.graph).unwrap();
        write_atomically(&loaded.file, &formatted).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), FIXTURE);
    }

    #[test]
    fn target_summary() {
        let graph = pbx_project::parse(FIXTURE.as_bytes()).unwrap();
        let rows = target_rows(&graph).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Demo");
        assert_eq!(rows[0].product_type, Some("com.apple.product-type.application"));
        assert_eq!(
            rows[0].phases,
            ["Sources", "Frameworks", "Resources", "Run SwiftLint"]
        );
        assert_eq!(rows[0].configurations, ["Debug", "Release"]);
        assert_eq!(rows[1].isa, Isa::LegacyTarget);
    }
}
