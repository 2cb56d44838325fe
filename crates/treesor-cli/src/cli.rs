use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use treesor_store::{Path, ValueType};

#[derive(Parser)]
#[command(
    name = "treesor",
    about = "Treesor: a tree of items with typed, identity-keyed properties",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Snapshot file holding the store.
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an item
    New(NewArgs),
    /// Remove an item
    Rm(RmArgs),
    /// Rename an item within its parent
    Rename(RenameArgs),
    /// Copy an item to a new location
    Cp(CpArgs),
    /// Move an item to a new location
    Mv(MvArgs),
    /// List child or descendant items
    Ls(LsArgs),
    /// Manage property columns
    Column(ColumnArgs),
    /// Set a property value
    Set(SetArgs),
    /// Show a property value
    Get(PropertyArgs),
    /// Clear a property value
    Clear(PropertyArgs),
    /// Copy a property value between items or columns
    CopyProp(TransferArgs),
    /// Move a property value between items or columns
    MoveProp(TransferArgs),
    /// Drop property values of removed items
    Compact,
}

#[derive(Args)]
pub struct NewArgs {
    pub path: Path,
}

#[derive(Args)]
pub struct RmArgs {
    pub path: Path,
    #[arg(short, long)]
    pub recursive: bool,
}

#[derive(Args)]
pub struct RenameArgs {
    pub path: Path,
    pub new_name: String,
}

#[derive(Args)]
pub struct CpArgs {
    pub source: Path,
    pub destination: Path,
    #[arg(short, long)]
    pub recursive: bool,
}

#[derive(Args)]
pub struct MvArgs {
    pub source: Path,
    pub destination: Path,
}

#[derive(Args)]
pub struct LsArgs {
    /// Item to list; the root if omitted.
    pub path: Option<Path>,
    #[arg(short, long)]
    pub recursive: bool,
    #[arg(long, requires = "recursive")]
    pub breadth_first: bool,
}

#[derive(Args)]
pub struct ColumnArgs {
    #[command(subcommand)]
    pub action: ColumnAction,
}

#[derive(Subcommand)]
pub enum ColumnAction {
    /// Create a column of the given type
    Create { name: String, value_type: ValueType },
    /// Remove a column and its values
    Rm { name: String },
    /// Rename a column
    Rename { old_name: String, new_name: String },
    /// List columns
    Ls,
}

#[derive(Args)]
pub struct SetArgs {
    pub path: Path,
    pub column: String,
    /// Value text, parsed according to the column type.
    #[arg(required_unless_present = "null")]
    pub value: Option<String>,
    /// Store an explicit null.
    #[arg(long, conflicts_with = "value")]
    pub null: bool,
}

#[derive(Args)]
pub struct PropertyArgs {
    pub path: Path,
    pub column: String,
}

#[derive(Args)]
pub struct TransferArgs {
    pub source: Path,
    pub source_column: String,
    pub destination: Path,
    pub destination_column: String,
}
