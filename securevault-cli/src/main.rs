//! Developer CLI for encrypted vault backups.
//!
//! Keeps a local JSON vault of credential records and exercises the
//! full backup engine against the real filesystem: private backups land
//! under the user data directory, shared backups under
//! `Downloads/SecureVault_Backups`, matching the mobile apps' layout.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::{eyre, WrapErr};
use tracing_subscriber::EnvFilter;

use securevault_core::platform::{CredentialStore, FsFileStore};
use securevault_core::{BackupService, PasswordRecord, DEFAULT_KEEP_COUNT};

mod store;

use store::JsonVaultStore;

#[derive(Parser)]
#[command(name = "securevault", version, about = "SecureVault backup tool")]
struct Cli {
    /// Override the vault data directory (vault file + private backups).
    #[arg(long, env = "SECUREVAULT_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Disable the shared backup location entirely.
    #[arg(long, global = true)]
    no_shared: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a credential record to the local vault.
    Add {
        /// Display title, e.g. the site name.
        title: String,
        /// Login name.
        username: String,
        /// Free-text notes.
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List the records currently in the local vault.
    Records,
    /// Create an encrypted backup of the local vault.
    Create {
        /// Custom backup file name (a timestamped one is generated
        /// otherwise).
        #[arg(long)]
        file_name: Option<String>,
        /// Wipe the local vault after the backup is durable.
        #[arg(long)]
        delete_after: bool,
    },
    /// Check a backup file and password without restoring anything.
    Validate {
        /// Path to the backup file.
        path: String,
    },
    /// Restore records from a backup file into the local vault.
    Restore {
        /// Path to the backup file.
        path: String,
        /// Merge into the existing vault instead of replacing it.
        #[arg(long)]
        merge: bool,
    },
    /// List known backup files, newest first.
    List,
    /// Delete all but the newest backups.
    Cleanup {
        /// How many backups to keep.
        #[arg(long, default_value_t = DEFAULT_KEEP_COUNT)]
        keep: usize,
    },
}

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| dirs::data_local_dir().map(|d| d.join("securevault")))
        .ok_or_else(|| eyre!("no data directory available; pass --data-dir"))?;
    let shared_dir = if cli.no_shared {
        None
    } else {
        dirs::download_dir().map(|d| d.join("SecureVault_Backups"))
    };

    let store = JsonVaultStore::new(data_dir.join("vault.json"));
    let files = FsFileStore::new(data_dir.join("backups"), shared_dir);
    let service = BackupService::new(&store, &files);

    run(cli.command, &store, &service)
}

fn run(
    command: Command,
    store: &JsonVaultStore,
    service: &BackupService<&JsonVaultStore, &FsFileStore>,
) -> eyre::Result<()> {
    match command {
        Command::Add {
            title,
            username,
            notes,
        } => {
            let secret = prompt_password("Password for the record: ")?;
            let record = PasswordRecord::new(&title, &username, &secret, &notes);
            store.insert_many(std::slice::from_ref(&record))?;
            println!("Added {title} ({})", record.id);
        }
        Command::Records => {
            let records = store.list_all()?;
            if records.is_empty() {
                println!("Vault is empty.");
            }
            for record in records {
                println!("{}  {} ({})", record.id, record.title, record.username);
            }
        }
        Command::Create {
            file_name,
            delete_after,
        } => {
            let password = prompt_password("Backup password: ")?;
            let confirmed = prompt_password("Confirm backup password: ")?;
            if password != confirmed {
                return Err(eyre!("passwords do not match"));
            }
            let report = service.create(&password, file_name.as_deref(), delete_after)?;
            println!(
                "Backup created with {} passwords. {}",
                report.password_count,
                report.location.location_description()
            );
            if let Some(warning) = report.wipe_warning {
                println!("Warning: {warning}");
            }
        }
        Command::Validate { path } => {
            let password = prompt_password("Backup password: ")?;
            match service.validate_file(&path, &password) {
                Some(envelope) => println!(
                    "Valid backup: version {}, {} passwords, created {} by {} ({})",
                    envelope.version,
                    envelope.password_count,
                    envelope.timestamp,
                    envelope.app_name,
                    envelope.platform
                ),
                None => return Err(eyre!("invalid backup file or wrong password")),
            }
        }
        Command::Restore { path, merge } => {
            let password = prompt_password("Backup password: ")?;
            let report = service.restore_from_file(&path, &password, !merge)?;
            println!(
                "Restored {} of {} passwords.",
                report.restored_count, report.total_in_backup
            );
        }
        Command::List => {
            let backups = service.list_backups()?;
            if backups.is_empty() {
                println!("No backups found.");
            }
            for info in backups {
                let location = if info.shared { "shared" } else { "private" };
                println!(
                    "{}  {:>8}  [{location}]  {}",
                    info.name,
                    info.formatted_size(),
                    info.path
                );
            }
        }
        Command::Cleanup { keep } => {
            let removed = service.cleanup_old_backups(keep)?;
            println!("Removed {removed} old backup(s), kept up to {keep}.");
        }
    }

    Ok(())
}

fn prompt_password(prompt: &str) -> eyre::Result<String> {
    rpassword::prompt_password(prompt).wrap_err("cannot read password from terminal")
}
