//! Library matcher.
//!
//! Resolves a classified record to a concrete library item. The matching
//! key is exact, case-insensitive title equality; year breaks ties only
//! when several titles collide. Seasons resolve through their show,
//! episodes through show then season, and a failure at any stage reports
//! the furthest-resolved partial path.

use crate::models::item::{ItemKind, LibraryItem};
use crate::models::record::{HierarchyContext, NfoRecord};
use crate::services::library::LibraryService;
use crate::utils::text;
use crate::{Error, Result};

/// How far hierarchical resolution got before it stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialPath {
    /// Human-readable steps that did resolve, in order.
    pub resolved: Vec<String>,
    /// The step that could not be resolved.
    pub missing: String,
}

impl std::fmt::Display for PartialPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.resolved.is_empty() {
            write!(f, "{} not found", self.missing)
        } else {
            write!(f, "{} not found under {}", self.missing, self.resolved.join(" > "))
        }
    }
}

/// Outcome of a lookup. Ambiguity is distinct from absence: the matcher
/// must never silently pick the first of several exact-title candidates.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Found(LibraryItem),
    NotFound(PartialPath),
    Ambiguous { title: String, candidates: usize },
}

/// Library matcher over a [`LibraryService`].
pub struct Matcher<'a> {
    service: &'a dyn LibraryService,
}

impl<'a> Matcher<'a> {
    pub fn new(service: &'a dyn LibraryService) -> Self {
        Self { service }
    }

    /// Resolve a record to a library item.
    ///
    /// `context` must be present for season and episode records; it is
    /// ignored for shows and movies.
    pub async fn resolve(
        &self,
        record: &NfoRecord,
        context: Option<&HierarchyContext>,
    ) -> Result<MatchOutcome> {
        match record {
            NfoRecord::Movie { common } => {
                self.resolve_titled(ItemKind::Movie, &common.title, common.year)
                    .await
            }
            NfoRecord::Show { common, .. } => {
                self.resolve_titled(ItemKind::Show, &common.title, common.year)
                    .await
            }
            NfoRecord::Season { season_number, .. } => {
                let ctx = require_context(context)?;
                match self.resolve_show(ctx).await? {
                    MatchOutcome::Found(show) => {
                        self.resolve_child(
                            &show,
                            ItemKind::Season,
                            u32::from(*season_number),
                            vec![item_label(&show)],
                        )
                        .await
                    }
                    other => Ok(other),
                }
            }
            NfoRecord::Episode {
                season_number,
                episode_number,
                ..
            } => {
                let ctx = require_context(context)?;
                match self.resolve_show(ctx).await? {
                    MatchOutcome::Found(show) => {
                        match self
                            .resolve_child(
                                &show,
                                ItemKind::Season,
                                u32::from(*season_number),
                                vec![item_label(&show)],
                            )
                            .await?
                        {
                            MatchOutcome::Found(season) => {
                                self.resolve_child(
                                    &season,
                                    ItemKind::Episode,
                                    u32::from(*episode_number),
                                    vec![item_label(&show), item_label(&season)],
                                )
                                .await
                            }
                            other => Ok(other),
                        }
                    }
                    other => Ok(other),
                }
            }
        }
    }

    async fn resolve_show(&self, ctx: &HierarchyContext) -> Result<MatchOutcome> {
        self.resolve_titled(ItemKind::Show, &ctx.show_title, ctx.show_year)
            .await
    }

    /// Stage one: exact-title (case-insensitive) lookup, year tie-break.
    async fn resolve_titled(
        &self,
        kind: ItemKind,
        title: &str,
        year: Option<u16>,
    ) -> Result<MatchOutcome> {
        // NFOs may omit <year> but carry it in the title, "Heat (1995)".
        let (bare_title, title_year) = text::split_trailing_year(title);
        let year = year.or(title_year);

        let candidates = self.service.find_by_title(kind, &bare_title).await?;
        let mut exact: Vec<LibraryItem> = candidates
            .into_iter()
            .filter(|c| c.title_matches(&bare_title))
            .collect();

        if exact.len() > 1 {
            if let Some(year) = year {
                exact.retain(|c| c.year == Some(year));
            }
        }

        match exact.len() {
            0 => Ok(MatchOutcome::NotFound(PartialPath {
                resolved: Vec::new(),
                missing: format!("{kind} '{bare_title}'"),
            })),
            1 => Ok(MatchOutcome::Found(exact.remove(0))),
            n => Ok(MatchOutcome::Ambiguous {
                title: bare_title,
                candidates: n,
            }),
        }
    }

    /// Stage two/three: resolve a numbered child within a parent item.
    ///
    /// `resolved` carries the labels of every ancestor that did resolve,
    /// so a miss reports the full path down to the break.
    async fn resolve_child(
        &self,
        parent: &LibraryItem,
        kind: ItemKind,
        number: u32,
        resolved: Vec<String>,
    ) -> Result<MatchOutcome> {
        let children = self.service.children_of(parent).await?;
        let found = children
            .into_iter()
            .find(|c| c.kind == kind && c.index == Some(number));

        match found {
            Some(item) => Ok(MatchOutcome::Found(item)),
            None => Ok(MatchOutcome::NotFound(PartialPath {
                resolved,
                missing: format!("{kind} {number}"),
            })),
        }
    }
}

/// Label an item for partial-path reporting: numbered children by their
/// number, everything else by title.
fn item_label(item: &LibraryItem) -> String {
    match item.index {
        Some(index) => format!("{} {}", item.kind, index),
        None => format!("{} '{}'", item.kind, item.title),
    }
}

fn require_context(context: Option<&HierarchyContext>) -> Result<&HierarchyContext> {
    context.ok_or_else(|| {
        Error::HierarchyResolution("season/episode record without show context".to_string())
    })
}
