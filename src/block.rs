/// Nominal pagination weight for blocks that render as a visual unit
/// rather than flowing text (charts, timelines, cost breakdowns).
pub const VISUAL_NOMINAL_LENGTH: u32 = 600;

/// Nominal pagination weight for fixed sections (cover, parties,
/// signatures, terms headings).
pub const FIXED_SECTION_NOMINAL_LENGTH: u32 = 400;

/// Stable identity of a content block across both pagination passes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(raw: &str) -> Self {
        BlockId::new(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualComponentKind {
    PieChart,
    Timeline,
    TechStack,
    CostBreakdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// One billable row of an invoice table.
    LineItem {
        description: String,
        quantity: u32,
        rate_cents: i64,
    },
    /// One contract clause: a numbered title plus body text.
    Clause { title: String, body: String },
    /// A themed visual unit (chart, timeline, stack, breakdown).
    VisualComponent {
        title: String,
        component: VisualComponentKind,
    },
    /// A section that exists independent of authored content: cover,
    /// parties, terms heading, signatures.
    FixedSection { title: String },
}

/// Atomic, non-splittable unit of document content subject to pagination.
/// Immutable for the duration of one pass; each pass reads a fresh
/// snapshot and borrows it read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBlock {
    pub id: BlockId,
    pub kind: BlockKind,
    pub estimated_length: u32,
    pub group_key: Option<String>,
    pub must_start_new_page: bool,
}

impl ContentBlock {
    pub fn line_item(
        id: impl Into<BlockId>,
        description: impl Into<String>,
        quantity: u32,
        rate_cents: i64,
    ) -> Self {
        let description = description.into();
        let estimated_length = description.chars().count() as u32;
        Self {
            id: id.into(),
            kind: BlockKind::LineItem {
                description,
                quantity,
                rate_cents,
            },
            estimated_length,
            group_key: None,
            must_start_new_page: false,
        }
    }

    pub fn clause(
        id: impl Into<BlockId>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let body = body.into();
        let estimated_length = body.chars().count() as u32;
        Self {
            id: id.into(),
            kind: BlockKind::Clause {
                title: title.into(),
                body,
            },
            estimated_length,
            group_key: None,
            must_start_new_page: false,
        }
    }

    pub fn visual(
        id: impl Into<BlockId>,
        title: impl Into<String>,
        component: VisualComponentKind,
    ) -> Self {
        Self {
            id: id.into(),
            kind: BlockKind::VisualComponent {
                title: title.into(),
                component,
            },
            estimated_length: VISUAL_NOMINAL_LENGTH,
            group_key: None,
            must_start_new_page: false,
        }
    }

    pub fn fixed_section(id: impl Into<BlockId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: BlockKind::FixedSection {
                title: title.into(),
            },
            estimated_length: FIXED_SECTION_NOMINAL_LENGTH,
            group_key: None,
            must_start_new_page: false,
        }
    }

    pub fn with_group_key(mut self, key: impl Into<String>) -> Self {
        self.group_key = Some(key.into());
        self
    }

    pub fn starting_new_page(mut self) -> Self {
        self.must_start_new_page = true;
        self
    }

    /// Title shown in a page header when this block opens a fresh section
    /// page. Line items carry no section identity.
    pub fn section_title(&self) -> Option<&str> {
        match &self.kind {
            BlockKind::Clause { title, .. } => Some(title),
            BlockKind::VisualComponent { title, .. } => Some(title),
            BlockKind::FixedSection { title } => Some(title),
            BlockKind::LineItem { .. } => None,
        }
    }
}
