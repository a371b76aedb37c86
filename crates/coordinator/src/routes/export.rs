use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use futures_util::stream;
use rcd_storage::ListFilter;
use rcd_wire::api::{CommandView, ExportFormat, ExportQuery};

use crate::context::CoordinatorContext;
use crate::error::ApiError;

const PAGE_SIZE: u32 = 500;

/// `GET /history/export?format=json|csv` — a streaming dump, paged from the
/// store so an export larger than memory still completes: each page is
/// turned into one chunk of the response body rather than buffered whole.
pub async fn export(
    State(ctx): State<CoordinatorContext>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let format = query.format;
    let base_filter = ListFilter {
        agent_id: query.filter.agent_id,
        status: query.filter.status,
        created_after_ms: query.filter.created_after_ms,
        created_before_ms: query.filter.created_before_ms,
        limit: PAGE_SIZE,
        offset: 0,
    };

    let body = Body::from_stream(stream::unfold(
        (ctx, base_filter, 0u32, format, true),
        move |(ctx, mut filter, offset, format, first)| async move {
            filter.offset = offset;
            let rows = match ctx.store.list_commands(filter.clone()).await {
                Ok(rows) => rows,
                Err(_) => return None,
            };
            if rows.is_empty() {
                return None;
            }
            let views: Vec<CommandView> = rows.into_iter().map(CommandView::from).collect();
            let chunk = render_chunk(&views, format, first);
            let next_offset = offset + filter.limit;
            Some((Ok::<_, std::io::Error>(chunk), (ctx, filter, next_offset, format, false)))
        },
    ));

    let content_type = match format {
        ExportFormat::Json => "application/x-ndjson",
        ExportFormat::Csv => "text/csv",
    };
    Ok(Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .body(body)
        .unwrap_or_else(|_| Response::new(Body::empty())))
}

fn render_chunk(views: &[CommandView], format: ExportFormat, first: bool) -> String {
    match format {
        ExportFormat::Json => views
            .iter()
            .map(|v| serde_json::to_string(v).unwrap_or_default())
            .map(|line| line + "\n")
            .collect(),
        ExportFormat::Csv => {
            let mut out = String::new();
            if first {
                out.push_str("command_id,agent_id,status,created_at_ms,completed_at_ms,exit_code\n");
            }
            for v in views {
                out.push_str(&format!(
                    "{},{},{},{},{},{}\n",
                    v.command_id,
                    v.agent_id,
                    v.status,
                    v.created_at_ms,
                    v.completed_at_ms.map(|t| t.to_string()).unwrap_or_default(),
                    v.exit_code.map(|c| c.to_string()).unwrap_or_default(),
                ));
            }
            out
        }
    }
}
