// CLI command definitions

use super::k8s::{CapabilitiesCommand, MountsCommand, PlanCommand};
use crate::domain::engine::ExecutionContext;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "kube-conductor",
    version,
    about = "Lifecycle playbook generator for multi-service applications on Kubernetes",
    long_about = "Turns a container.yml style project into an ordered, tagged playbook that \
creates, starts, stops, restarts and destroys the application on Kubernetes"
)]
pub struct CliArgs {
    /// Execution context this process runs in
    #[arg(long, value_enum, global = true, default_value_t = ContextArg::Host)]
    pub context: ContextArg,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextArg {
    /// The developer's machine, with access to local credential files
    Host,
    /// The management container that authors the playbook
    Conductor,
}

impl From<ContextArg> for ExecutionContext {
    fn from(arg: ContextArg) -> Self {
        match arg {
            ContextArg::Host => ExecutionContext::Host,
            ContextArg::Conductor => ExecutionContext::Conductor,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate the lifecycle playbook (conductor context)
    Plan(PlanCommand),

    /// Print the credential files to mount into the conductor (host context)
    Mounts(MountsCommand),

    /// Show which lifecycle operations the engine supports
    Capabilities(CapabilitiesCommand),
}
