//! The paginated search, extraction and deduplication loop shared by both
//! front ends.
//!
//! A run moves from running to stopped when the target is reached, a page
//! comes back empty, or the [`StopSignal`] is observed. The signal is polled
//! between items and between pages only, so an in-flight search request is
//! never interrupted and stopping can lag by one request round-trip.

use crate::delay_manager;
use crate::extractor::{extract_emails, extract_phones, name_from_title};
use crate::search_engine::{ResultItem, SearchProvider};
use log::info;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const PAGE_SIZE: u32 = 10;
pub const NO_PHONE: &str = "N/A";

/// A contact accepted from one result item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lead {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub profile_link: String,
}

impl Lead {
    pub fn phone_or_marker(&self) -> &str {
        self.phone.as_deref().unwrap_or(NO_PHONE)
    }
}

/// Cooperative cancellation flag shared between a worker and its controller.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        StopSignal::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub page_size: u32,
    pub page_delay: Duration,
    pub page_jitter: Duration,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        CollectorSettings {
            page_size: PAGE_SIZE,
            page_delay: Duration::from_secs(2),
            page_jitter: Duration::from_secs(1),
        }
    }
}

impl CollectorSettings {
    pub fn without_pacing() -> Self {
        CollectorSettings {
            page_delay: Duration::ZERO,
            page_jitter: Duration::ZERO,
            ..CollectorSettings::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorEvent {
    Searching { offset: u32, collected: usize, target: usize },
    LeadFound(Lead),
    Exhausted,
    Stopped { collected: usize },
    Finished { collected: usize, target: usize },
}

impl fmt::Display for CollectorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectorEvent::Searching {
                collected, target, ..
            } => write!(f, "Searching... Found {}/{} contacts so far.", collected, target),
            CollectorEvent::LeadFound(lead) => {
                write!(f, "  -> Found: {} | Email: {}", lead.name, lead.email)
            }
            CollectorEvent::Exhausted => write!(f, "No more search results found."),
            CollectorEvent::Stopped { collected } => {
                write!(f, "Stopped by user with {} contacts collected.", collected)
            }
            CollectorEvent::Finished { collected, target } => {
                write!(f, "Collected {}/{} contacts.", collected, target)
            }
        }
    }
}

/// Builds a lead from a result item when its title or snippet carries an
/// email address.
///
/// With several candidates the first one in set iteration order is taken,
/// which is not stable across runs.
pub fn lead_from_item(item: &ResultItem) -> Option<Lead> {
    let name = name_from_title(&item.title);
    let text = format!("{} {}", name, item.snippet);

    let email = extract_emails(&text).into_iter().next()?;
    let phone = extract_phones(&text).into_iter().next();

    Some(Lead {
        name,
        email,
        phone,
        profile_link: item.link.clone(),
    })
}

pub struct Collector<'a, P> {
    provider: &'a P,
    settings: CollectorSettings,
}

impl<'a, P: SearchProvider> Collector<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self::with_settings(provider, CollectorSettings::default())
    }

    pub fn with_settings(provider: &'a P, settings: CollectorSettings) -> Self {
        Collector { provider, settings }
    }

    /// Runs the loop until `target` leads are accepted, results run out or
    /// `stop` is raised. Leads come back in acceptance order, unique by link.
    pub fn collect<F>(
        &self,
        query: &str,
        target: usize,
        stop: &StopSignal,
        mut on_event: F,
    ) -> Vec<Lead>
    where
        F: FnMut(CollectorEvent),
    {
        let mut leads: Vec<Lead> = Vec::new();
        let mut seen_links: HashSet<String> = HashSet::new();
        let mut offset: u32 = 1;

        while leads.len() < target && !stop.is_stopped() {
            on_event(CollectorEvent::Searching {
                offset,
                collected: leads.len(),
                target,
            });

            let page = self.provider.search(query, offset);
            if page.is_empty() {
                info!("No more results at offset {}", offset);
                on_event(CollectorEvent::Exhausted);
                break;
            }

            for item in &page {
                if stop.is_stopped() {
                    break;
                }
                if item.link.is_empty() || !seen_links.insert(item.link.clone()) {
                    continue;
                }

                if let Some(lead) = lead_from_item(item) {
                    info!("Found: {} | {} | {}", lead.name, lead.email, lead.profile_link);
                    on_event(CollectorEvent::LeadFound(lead.clone()));
                    leads.push(lead);
                }

                if leads.len() >= target {
                    break;
                }
            }

            offset = offset.saturating_add(self.settings.page_size);
            if leads.len() < target && !stop.is_stopped() {
                delay_manager::page_delay(
                    self.settings.page_delay,
                    self.settings.page_jitter,
                    stop,
                );
            }
        }

        if stop.is_stopped() && leads.len() < target {
            info!("Collection stopped at {} leads", leads.len());
            on_event(CollectorEvent::Stopped {
                collected: leads.len(),
            });
        }
        on_event(CollectorEvent::Finished {
            collected: leads.len(),
            target,
        });
        leads
    }
}
