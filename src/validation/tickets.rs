use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::gateway::{ForgeGateway, GatewayResult};
use crate::report::{CheckResult, Report, ReportKind};
use crate::repository::Repository;
use crate::validation::structure::releasable_version;
use crate::validation::RepositoryValidator;

/// Cross-check the tickets of a release letter against the closed issues
pub fn check_tickets(
    referenced: &[u32],
    closed: GatewayResult<BTreeSet<u32>>,
    on_default_branch: bool,
) -> CheckResult {
    let closed = match closed {
        Ok(closed) => closed,
        Err(e) => {
            return CheckResult::failure(
                "E-RD-GH-22",
                format!("Unable to retrieve the list of closed tickets: {}", e),
            )
        }
    };

    let wrong: Vec<String> = referenced
        .iter()
        .filter(|&&ticket| !closed.contains(&ticket))
        .map(u32::to_string)
        .collect();
    if wrong.is_empty() {
        return CheckResult::success("All tickets mentioned in the release letter are closed.");
    }

    let tickets = wrong.join(", ");
    if on_default_branch {
        CheckResult::failure(
            "E-RD-GH-23",
            format!(
                "Some of the mentioned tickets are not closed or do not exist: {}. \
                 Please make sure you mentioned the correct tickets and closed them.",
                tickets
            ),
        )
    } else {
        let message = format!(
            "W-RD-GH-24: Don't forget to close the tickets mentioned in the release letter: {}",
            tickets
        );
        warn!("{}", message);
        CheckResult::success(message)
    }
}

/// Ticket cross-reference check against the forge
pub struct TicketValidator {
    forge: Arc<dyn ForgeGateway>,
}

impl TicketValidator {
    pub fn new(forge: Arc<dyn ForgeGateway>) -> Self {
        TicketValidator { forge }
    }
}

impl RepositoryValidator for TicketValidator {
    fn name(&self) -> &'static str {
        "tickets"
    }

    fn validate(&self, repository: &dyn Repository) -> Result<Report> {
        let Some(version) = releasable_version(repository)? else {
            return Ok(Report::validation());
        };
        debug!(repository = repository.name(), version = %version, "validating ticket references");

        let letter = repository.release_letter(&version)?;
        let closed = self.forge.closed_issue_numbers(repository.name());
        Ok(Report::single(
            ReportKind::Validation,
            check_tickets(
                letter.ticket_numbers(),
                closed,
                repository.is_on_default_branch()?,
            ),
        ))
    }
}
