// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;
use kube_conductor::cli::{commands::Commands, CliArgs};
use kube_conductor::ExecutionContext;

fn main() -> anyhow::Result<()> {
    // Playbooks go to stdout, logs to stderr
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args = CliArgs::parse();
    let context: ExecutionContext = args.context.into();

    match args.command {
        Commands::Plan(cmd) => cmd.execute(context),
        Commands::Mounts(cmd) => cmd.execute(context),
        Commands::Capabilities(cmd) => cmd.execute(),
    }
}
