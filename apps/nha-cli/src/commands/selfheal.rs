// selfheal.rs — The `nha selfheal` subcommands: check, snapshot.
//
// `check` is fail-closed: a problem without --auto-reload is reported and
// the process exits non-zero with the registry left untouched. `snapshot`
// is the only sanctioned producer of the backup that `check` restores from.

use std::path::PathBuf;

use anyhow::bail;
use clap::Subcommand;

use nha_registry::{
    check_registry, load_registry, save_backup, CheckOptions, HealthState, RegistryBackup,
};

#[derive(Subcommand)]
pub enum SelfhealCommands {
    /// Validate the live registry against its backup snapshot.
    Check {
        /// The live registry file.
        #[arg(long, default_value = "cblm/opipe/nha/agents.yaml")]
        registry_file: PathBuf,

        /// The known-good backup snapshot.
        #[arg(long, default_value = "cblm/opipe/nha/out/registry.json")]
        backup_file: PathBuf,

        /// Compare the registry's content digest against the backup's.
        #[arg(long)]
        check_signature: bool,

        /// Restore from backup when drift or corruption is found.
        #[arg(long)]
        auto_reload: bool,

        /// Print every problem found, not just the verdict.
        #[arg(long)]
        verbose: bool,
    },
    /// Write a known-good backup snapshot of the registry.
    Snapshot {
        /// The live registry file.
        #[arg(long, default_value = "cblm/opipe/nha/agents.yaml")]
        registry_file: PathBuf,

        /// Where the snapshot is written.
        #[arg(long, default_value = "cblm/opipe/nha/out/registry.json")]
        backup_file: PathBuf,
    },
}

pub fn execute(cmd: &SelfhealCommands) -> anyhow::Result<()> {
    match cmd {
        SelfhealCommands::Check {
            registry_file,
            backup_file,
            check_signature,
            auto_reload,
            verbose,
        } => {
            let report = check_registry(
                registry_file,
                backup_file,
                &CheckOptions {
                    check_signature: *check_signature,
                    auto_reload: *auto_reload,
                },
            )?;

            if *verbose {
                for problem in &report.problems {
                    eprintln!("  - {}", problem);
                }
            }

            match report.state {
                HealthState::Healthy => {
                    println!("Registry healthy: {}", registry_file.display());
                    Ok(())
                }
                HealthState::Restored => {
                    println!(
                        "Registry restored from backup: {} <- {}",
                        registry_file.display(),
                        backup_file.display(),
                    );
                    Ok(())
                }
                _ => {
                    bail!(
                        "registry check failed ({}): {}",
                        report.state,
                        report.problems.join("; "),
                    );
                }
            }
        }

        SelfhealCommands::Snapshot {
            registry_file,
            backup_file,
        } => {
            let registry = load_registry(registry_file)?;
            let backup = RegistryBackup::capture(&registry)?;
            save_backup(backup_file, &backup)?;
            println!(
                "Snapshot of {} agent(s) written -> {} (sha256 {})",
                backup.nhas.len(),
                backup_file.display(),
                backup.sha256,
            );
            Ok(())
        }
    }
}
