// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use anyhow::Result;
use cbean_sql::{DatabaseKind, SqlDialect, create_dialect};
use clap::{ArgMatches, Command};
use colored::Colorize;

use super::command::CommandDefinition;

pub struct DialectsCommandDefinition {}

impl CommandDefinition for DialectsCommandDefinition {
    fn command(&self) -> Command {
        Command::new("dialects").about("List the supported dialects and their capabilities")
    }

    fn execute(&self, _matches: &ArgMatches) -> Result<()> {
        println!(
            "{}",
            format!(
                "{:<10} {:<12} {:<11} {:<6} {:<16} {:<17} {}",
                "dialect",
                "start-index",
                "fetch-size",
                "lock",
                "union-enclosing",
                "join-parentheses",
                "in-limit"
            )
            .bold()
        );

        for kind in DatabaseKind::ALL {
            println!("{}", capability_row(kind, create_dialect(kind).as_ref()));
        }
        Ok(())
    }
}

fn capability_row(kind: DatabaseKind, dialect: &dyn SqlDialect) -> String {
    let in_limit = dialect
        .in_scope_limit()
        .map(|limit| limit.to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{} {} {} {} {} {} {}",
        format!("{:<10}", kind.name()).cyan(),
        flag(dialect.is_fetch_start_index_supported(), 12),
        flag(dialect.is_fetch_size_supported(), 11),
        flag(dialect.lock_for_update("dflocal").is_ok(), 6),
        flag(dialect.requires_union_normal_select_enclosing(), 16),
        flag(dialect.is_join_in_parentheses(), 17),
        in_limit
    )
}

fn flag(value: bool, width: usize) -> String {
    if value {
        format!("{:<width$}", "yes").green().to_string()
    } else {
        format!("{:<width$}", "no").red().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn rows_report_capabilities() {
        colored::control::set_override(false);

        let oracle = capability_row(
            DatabaseKind::Oracle,
            create_dialect(DatabaseKind::Oracle).as_ref(),
        );
        assert!(oracle.starts_with("oracle "));
        assert!(oracle.ends_with(" 1000"));

        let access = capability_row(
            DatabaseKind::MsAccess,
            create_dialect(DatabaseKind::MsAccess).as_ref(),
        );
        assert!(access.contains("yes"));
        assert!(access.ends_with(" -"));
    }
}
