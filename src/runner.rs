/*
 * This file is part of switchinfo.
 *
 * Copyright (C) 2025 switchinfo contributors
 *
 * switchinfo is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * switchinfo is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with switchinfo. If not, see <https://www.gnu.org/licenses/>.
 */

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use sw_core::constants::versions;
use sw_core::{Assembler, NodeDescriptionWrite, PortCountSource, RegisterTool, SnapshotRequest, ToolVersion};
use sw_error::{Result, SwitchInfoError};
use tracing::{debug, info};

use crate::logger;
use crate::render::{render, OutputFormat};

/// What one invocation does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Query { request: SnapshotRequest, format: OutputFormat },
    SetDescription(String),
}

/// Run a tool call on the blocking pool, bounded by `limit` when given
async fn blocking<T, F>(what: &str, limit: Option<Duration>, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let job = tokio::task::spawn_blocking(f);
    let joined = match limit {
        Some(limit) => tokio::time::timeout(limit, job).await.map_err(|_| {
            SwitchInfoError::Timeout(format!("{} did not answer within {}s", what, limit.as_secs_f32()))
        })?,
        None => job.await,
    };
    joined.map_err(|e| SwitchInfoError::Generic(format!("{} task failed: {}", what, e)))?
}

/// Run `action` against the device behind `tool` and return what to print
pub async fn execute(
    action: Action,
    tool: Arc<dyn RegisterTool>,
    ports: Arc<dyn PortCountSource>,
    timeout: Option<Duration>,
) -> Result<String> {
    let version = {
        let tool = Arc::clone(&tool);
        blocking("version check", timeout, move || tool.version()).await?
    };
    debug!("Register tool version {}", version);

    match action {
        Action::Query { request, format } => {
            version.ensure_at_least(ToolVersion::from_tuple(versions::READ_MINIMUM), "reading registers")?;
            let snapshot = Assembler::new(tool, ports, version)
                .with_timeout(timeout)
                .collect(request)
                .await?;
            logger::log_event(
                "snapshot",
                json!({
                    "category": request.category.as_str(),
                    "module_temps": request.module_temps,
                    "power_supplies": snapshot.power_supplies.len(),
                    "port_count": snapshot.identity.port_count,
                }),
            );
            render(&snapshot, format)
        }
        Action::SetDescription(text) => {
            // Validated and encoded before the device is touched
            let write = NodeDescriptionWrite::build(&text, version)?;
            // Writes run to completion regardless of the timeout
            let write = blocking("node description write", None, move || {
                write.apply(tool.as_ref())?;
                Ok(write)
            })
            .await?;
            info!("Node description updated");
            logger::log_event("node_description_write", json!({ "description": write.description() }));
            Ok(format!("Node description set to \"{}\"\n", write.description()))
        }
    }
}
