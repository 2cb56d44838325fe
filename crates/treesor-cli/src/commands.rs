use std::io::Write;
use std::path::{Path as FsPath, PathBuf};

use anyhow::Context;
use colored::Colorize;
use tracing::debug;
use treesor_store::{
    InMemoryHierarchy, Item, Path, StoreConfig, TraversalOrder, TreeStore, Value,
};

use crate::cli::*;

const DEFAULT_STORE_FILE: &str = "treesor.json";

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => StoreConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => StoreConfig::default(),
    };
    let store_path = cli
        .store
        .clone()
        .or_else(|| config.snapshot_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE));

    let (mut store, declared) = open_store(&store_path, &config)?;
    let mutated = execute(&mut store, cli.command, &mut std::io::stdout().lock())?;

    if mutated || declared {
        store
            .save(&store_path, config.snapshot_format)
            .with_context(|| format!("failed to save {}", store_path.display()))?;
    }
    Ok(())
}

/// Load the store at `path`, or start an empty one if the file is missing.
///
/// Returns `true` alongside the store if the config declared columns the
/// snapshot did not have yet.
fn open_store(path: &FsPath, config: &StoreConfig) -> anyhow::Result<(TreeStore, bool)> {
    if !path.exists() {
        debug!(path = %path.display(), "no snapshot; starting with an empty store");
        let store = TreeStore::with_config(InMemoryHierarchy::new(), config)?;
        return Ok((store, !config.columns.is_empty()));
    }

    let mut store = TreeStore::load(path, config.snapshot_format)
        .with_context(|| format!("failed to load {}", path.display()))?;
    store.set_traversal(config.traversal);
    let before = store.columns().len();
    for declared in &config.columns {
        store.create_column(&declared.name, declared.value_type)?;
    }
    let declared = store.columns().len() != before;
    Ok((store, declared))
}

/// Run one command against `store`, writing output to `out`.
///
/// Returns `true` if the command may have changed the store.
fn execute(store: &mut TreeStore, command: Command, out: &mut impl Write) -> anyhow::Result<bool> {
    match command {
        Command::New(args) => {
            let item = store.new_item(&args.path, None)?;
            writeln!(out, "{} Created {}", "✓".green().bold(), describe(&item))?;
            Ok(true)
        }
        Command::Rm(args) => {
            let removed = store.remove_item(&args.path, args.recursive)?;
            if removed {
                writeln!(out, "{} Removed {}", "✓".green().bold(), show(&args.path).bold())?;
            } else {
                writeln!(out, "Nothing to remove at {}", show(&args.path).bold())?;
            }
            Ok(removed)
        }
        Command::Rename(args) => {
            let renamed = store.rename_item(&args.path, &args.new_name)?;
            if renamed {
                writeln!(
                    out,
                    "{} Renamed {} to {}",
                    "✓".green().bold(),
                    show(&args.path).bold(),
                    args.new_name.yellow()
                )?;
            } else {
                writeln!(out, "Nothing to rename at {}", show(&args.path).bold())?;
            }
            Ok(renamed)
        }
        Command::Cp(args) => {
            let copied = store.copy_item(&args.source, &args.destination, args.recursive)?;
            if copied {
                writeln!(
                    out,
                    "{} Copied {} to {}",
                    "✓".green().bold(),
                    show(&args.source).bold(),
                    show(&args.destination).bold()
                )?;
            } else {
                writeln!(out, "Nothing to copy from {}", show(&args.source).bold())?;
            }
            Ok(copied)
        }
        Command::Mv(args) => {
            let moved = store.move_item(&args.source, &args.destination)?;
            if moved {
                writeln!(
                    out,
                    "{} Moved {} to {}",
                    "✓".green().bold(),
                    show(&args.source).bold(),
                    show(&args.destination).bold()
                )?;
            } else {
                writeln!(out, "Nothing to move from {}", show(&args.source).bold())?;
            }
            Ok(moved)
        }
        Command::Ls(args) => {
            cmd_ls(store, args, out)?;
            Ok(false)
        }
        Command::Column(args) => cmd_column(store, args.action, out),
        Command::Set(args) => {
            let value = match (args.null, args.value) {
                (true, _) => Value::Null,
                (false, Some(text)) => {
                    let column = store.get_column(&args.column)?;
                    Value::parse_as(column.value_type, &text)?
                }
                (false, None) => anyhow::bail!("a value or --null is required"),
            };
            store.set_property_value(&args.path, &args.column, value)?;
            writeln!(
                out,
                "{} Set {} on {}",
                "✓".green().bold(),
                args.column.cyan(),
                show(&args.path).bold()
            )?;
            Ok(true)
        }
        Command::Get(args) => {
            match store.get_property_value(&args.path, &args.column)? {
                Some(value) => writeln!(out, "{value}")?,
                None => writeln!(out, "{}", "(absent)".dimmed())?,
            }
            Ok(false)
        }
        Command::Clear(args) => {
            store.clear_property_value(&args.path, &args.column)?;
            writeln!(
                out,
                "Cleared {} on {}",
                args.column.cyan(),
                show(&args.path).bold()
            )?;
            Ok(true)
        }
        Command::CopyProp(args) => {
            store.copy_property_value(
                &args.source,
                &args.source_column,
                &args.destination,
                &args.destination_column,
            )?;
            writeln!(out, "Copied {}", transfer_summary(&args))?;
            Ok(true)
        }
        Command::MoveProp(args) => {
            store.move_property_value(
                &args.source,
                &args.source_column,
                &args.destination,
                &args.destination_column,
            )?;
            writeln!(out, "Moved {}", transfer_summary(&args))?;
            Ok(true)
        }
        Command::Compact => {
            let dropped = store.compact()?;
            writeln!(
                out,
                "{} Compacted: {} orphaned value(s) dropped",
                "✓".green(),
                dropped.to_string().bold()
            )?;
            Ok(dropped > 0)
        }
    }
}

fn cmd_ls(store: &TreeStore, args: LsArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let start = args.path.unwrap_or_else(Path::root);
    let items = if args.recursive {
        let order = if args.breadth_first {
            TraversalOrder::BreadthFirst
        } else {
            store.traversal()
        };
        store.descendant_items_ordered(&start, order)?
    } else {
        store.child_items(&start)?
    };

    if items.is_empty() {
        writeln!(out, "{}", "(no items)".dimmed())?;
    }
    for item in &items {
        writeln!(out, "{}", describe(item))?;
    }
    Ok(())
}

fn cmd_column(
    store: &mut TreeStore,
    action: ColumnAction,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    match action {
        ColumnAction::Create { name, value_type } => {
            let info = store.create_column(&name, value_type)?;
            writeln!(
                out,
                "{} Column {} ({})",
                "✓".green().bold(),
                info.name.cyan(),
                info.value_type
            )?;
            Ok(true)
        }
        ColumnAction::Rm { name } => {
            let removed = store.remove_column(&name);
            if removed {
                writeln!(out, "Removed column {}", name.cyan())?;
            } else {
                writeln!(out, "No column named {}", name.cyan())?;
            }
            Ok(removed)
        }
        ColumnAction::Rename { old_name, new_name } => {
            store.rename_column(&old_name, &new_name)?;
            writeln!(out, "Renamed column {} to {}", old_name.cyan(), new_name.cyan())?;
            Ok(true)
        }
        ColumnAction::Ls => {
            let columns = store.list_columns();
            if columns.is_empty() {
                writeln!(out, "{}", "(no columns)".dimmed())?;
            }
            for column in columns {
                writeln!(out, "{}\t{}", column.name.cyan(), column.value_type)?;
            }
            Ok(false)
        }
    }
}

fn show(path: &Path) -> String {
    if path.is_root() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

fn describe(item: &Item) -> String {
    format!("{} {}", show(&item.path), item.id.short_id().dimmed())
}

fn transfer_summary(args: &TransferArgs) -> String {
    format!(
        "{}:{} to {}:{}",
        show(&args.source),
        args.source_column.cyan(),
        show(&args.destination),
        args.destination_column.cyan()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use treesor_store::{SnapshotFormat, StoreError, ValueType};

    fn parse(args: &[&str]) -> Command {
        let argv = std::iter::once("treesor").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap().command
    }

    fn run(store: &mut TreeStore, args: &[&str]) -> anyhow::Result<(bool, String)> {
        colored::control::set_override(false);
        let mut out = Vec::new();
        let mutated = execute(store, parse(args), &mut out)?;
        Ok((mutated, String::from_utf8(out).unwrap()))
    }

    #[test]
    fn new_and_list() {
        let mut store = TreeStore::in_memory();
        let (mutated, _) = run(&mut store, &["new", "a"]).unwrap();
        assert!(mutated);
        run(&mut store, &["new", "a/b"]).unwrap();

        let (mutated, listing) = run(&mut store, &["ls", "-r"]).unwrap();
        assert!(!mutated);
        let paths: Vec<&str> = listing
            .lines()
            .map(|line| line.split(' ').next().unwrap())
            .collect();
        assert_eq!(paths, ["a", "a/b"]);
    }

    #[test]
    fn set_parses_by_column_type() {
        let mut store = TreeStore::in_memory();
        run(&mut store, &["new", "a"]).unwrap();
        run(&mut store, &["column", "create", "size", "integer"]).unwrap();
        run(&mut store, &["set", "a", "size", "42"]).unwrap();
        assert_eq!(
            store.get_property_value(&Path::parse("a"), "size").unwrap(),
            Some(Value::Integer(42))
        );

        let (_, text) = run(&mut store, &["get", "a", "size"]).unwrap();
        assert_eq!(text.trim(), "42");

        let err = run(&mut store, &["set", "a", "size", "many"]).unwrap_err();
        assert!(err.to_string().contains("many"));

        run(&mut store, &["column", "create", "ratio", "float"]).unwrap();
        let err = run(&mut store, &["set", "a", "ratio", "NaN"]).unwrap_err();
        assert!(err.to_string().contains("finite"));
        assert_eq!(store.get_property_value(&Path::parse("a"), "ratio").unwrap(), None);
    }

    #[test]
    fn set_on_missing_column_reports_store_error() {
        let mut store = TreeStore::in_memory();
        run(&mut store, &["new", "a"]).unwrap();
        let err = run(&mut store, &["set", "a", "size", "1"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::MissingProperty(_))
        ));
    }

    #[test]
    fn set_null_and_get_absent() {
        let mut store = TreeStore::in_memory();
        run(&mut store, &["new", "a"]).unwrap();
        run(&mut store, &["column", "create", "title", "string"]).unwrap();

        let (_, text) = run(&mut store, &["get", "a", "title"]).unwrap();
        assert_eq!(text.trim(), "(absent)");

        run(&mut store, &["set", "a", "title", "--null"]).unwrap();
        let (_, text) = run(&mut store, &["get", "a", "title"]).unwrap();
        assert_eq!(text.trim(), "null");
    }

    #[test]
    fn move_prop_between_items() {
        let mut store = TreeStore::in_memory();
        run(&mut store, &["new", "a"]).unwrap();
        run(&mut store, &["new", "b"]).unwrap();
        run(&mut store, &["column", "create", "p", "string"]).unwrap();
        run(&mut store, &["set", "a", "p", "x"]).unwrap();
        run(&mut store, &["move-prop", "a", "p", "b", "p"]).unwrap();
        assert_eq!(
            store.get_property_value(&Path::parse("a"), "p").unwrap(),
            None
        );
        assert_eq!(
            store.get_property_value(&Path::parse("b"), "p").unwrap(),
            Some(Value::from("x"))
        );
    }

    #[test]
    fn rm_missing_item_is_not_a_mutation() {
        let mut store = TreeStore::in_memory();
        let (mutated, text) = run(&mut store, &["rm", "ghost"]).unwrap();
        assert!(!mutated);
        assert!(text.contains("Nothing to remove"));
    }

    #[test]
    fn topology_no_ops_are_not_mutations() {
        let mut store = TreeStore::in_memory();
        run(&mut store, &["new", "a"]).unwrap();
        run(&mut store, &["new", "b"]).unwrap();

        let (mutated, text) = run(&mut store, &["mv", "ghost", "x"]).unwrap();
        assert!(!mutated);
        assert!(text.contains("Nothing to move"));

        let (mutated, text) = run(&mut store, &["cp", "ghost", "x"]).unwrap();
        assert!(!mutated);
        assert!(text.contains("Nothing to copy"));

        let (mutated, text) = run(&mut store, &["rename", "a", "b"]).unwrap();
        assert!(!mutated);
        assert!(text.contains("Nothing to rename"));

        let (mutated, text) = run(&mut store, &["mv", "a", "c"]).unwrap();
        assert!(mutated);
        assert!(text.contains("Moved a to c"));
    }

    #[test]
    fn no_op_does_not_rewrite_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store_file = dir.path().join("tree.json");
        let store_arg = store_file.to_str().unwrap();
        run_command(Cli::try_parse_from(["treesor", "--store", store_arg, "new", "a"]).unwrap())
            .unwrap();
        // A trailing newline marks the file; a save would drop it.
        let mut marked = std::fs::read(&store_file).unwrap();
        marked.push(b'\n');
        std::fs::write(&store_file, &marked).unwrap();

        run_command(
            Cli::try_parse_from(["treesor", "--store", store_arg, "mv", "ghost", "x"]).unwrap(),
        )
        .unwrap();

        assert_eq!(std::fs::read(&store_file).unwrap(), marked);
    }

    #[test]
    fn column_listing() {
        let mut store = TreeStore::in_memory();
        run(&mut store, &["column", "create", "b", "bool"]).unwrap();
        run(&mut store, &["column", "create", "a", "bytes"]).unwrap();
        let (_, text) = run(&mut store, &["column", "ls"]).unwrap();
        assert_eq!(text, "a\tbytes\nb\tbool\n");
    }

    #[test]
    fn store_persists_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let store_file = dir.path().join("tree.json");
        let store_arg = store_file.to_str().unwrap();

        for args in [
            vec!["new", "docs"],
            vec!["column", "create", "title", "string"],
            vec!["set", "docs", "title", "Readme"],
            vec!["mv", "docs", "archive"],
        ] {
            let mut argv = vec!["treesor", "--store", store_arg];
            argv.extend(args);
            run_command(Cli::try_parse_from(argv).unwrap()).unwrap();
        }

        let store = TreeStore::load(&store_file, SnapshotFormat::Json).unwrap();
        assert!(!store.item_exists(&Path::parse("docs")).unwrap());
        assert_eq!(
            store
                .get_property_value(&Path::parse("archive"), "title")
                .unwrap(),
            Some(Value::from("Readme"))
        );
    }

    #[test]
    fn config_declares_columns_and_format() {
        let dir = tempfile::tempdir().unwrap();
        let store_file = dir.path().join("tree.bin");
        let config_file = dir.path().join("treesor.toml");
        std::fs::write(
            &config_file,
            format!(
                "snapshot_path = {:?}\nsnapshot_format = \"binary\"\n\n\
                 [[columns]]\nname = \"size\"\nvalue_type = \"integer\"\n",
                store_file.to_str().unwrap()
            ),
        )
        .unwrap();

        let config_arg = config_file.to_str().unwrap();
        run_command(Cli::try_parse_from(["treesor", "--config", config_arg, "new", "a"]).unwrap())
            .unwrap();

        let store = TreeStore::load(&store_file, SnapshotFormat::Binary).unwrap();
        assert!(store.item_exists(&Path::parse("a")).unwrap());
        assert_eq!(store.get_column("size").unwrap().value_type, ValueType::Integer);
    }
}
