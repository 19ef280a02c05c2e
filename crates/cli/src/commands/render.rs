// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::PathBuf;

use anyhow::{Context, Result};
use cbean_sql::{ClauseConfig, SystemEnvironment};
use clap::{ArgMatches, Command};
use tracing::debug;

use super::command::{
    CommandDefinition, dialect_arg, get, get_required, no_select_index_arg, query_file_arg,
};
use crate::query_file::QueryFile;

pub struct RenderCommandDefinition {}

impl CommandDefinition for RenderCommandDefinition {
    fn command(&self) -> Command {
        Command::new("render")
            .about("Render the SQL of a query file")
            .arg(query_file_arg())
            .arg(dialect_arg())
            .arg(no_select_index_arg())
    }

    fn execute(&self, matches: &ArgMatches) -> Result<()> {
        let path: PathBuf = get_required(matches, "query")?;
        let query_file = QueryFile::load(&path)?;

        let config = effective_config(
            query_file.config.clone(),
            get::<String>(matches, "dialect"),
            matches.get_flag("no-select-index"),
        )?;
        debug!(dialect = %config.dialect, select_index = config.select_index, "Rendering");

        let sql = query_file
            .render(&config)
            .with_context(|| format!("Failed to render {}", path.display()))?;
        println!("{sql}");
        Ok(())
    }
}

/// The file's `[config]`, then the environment, then the command line
fn effective_config(
    file_config: ClauseConfig,
    dialect: Option<String>,
    no_select_index: bool,
) -> Result<ClauseConfig> {
    let mut config = file_config.apply_environment(&SystemEnvironment)?;
    if let Some(dialect) = dialect {
        config.dialect = dialect.parse()?;
    }
    if no_select_index {
        config.select_index = false;
    }
    Ok(config)
}
