use std::path::PathBuf;

use clap::Parser;

use crate::{cli::PortalArgs, prelude::*};

#[derive(Parser)]
pub struct DumpArgs {
    #[clap(flatten)]
    portal: PortalArgs,

    /// Output file, standard output when omitted.
    #[clap(long, short)]
    output: Option<PathBuf>,
}

impl DumpArgs {
    pub async fn run(self) -> Result {
        let snapshot = self.portal.api()?.fetch_snapshot().await?;
        match self.output {
            Some(path) => {
                snapshot.write_to(&path)?;
                info!(path = %path.display(), "Saved the snapshot");
            }
            None => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        }
        Ok(())
    }
}
