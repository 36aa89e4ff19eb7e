//! Advisory panels keyed by segment label

/// Cards per row in the insight grid
pub const CARDS_PER_ROW: usize = 3;

pub const NO_SEGMENT_NOTICE: &str =
    "Segment column not found. Please ensure your data includes customer segments.";

/// Color tone of an advisory card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Green,
    Blue,
    Orange,
    Red,
    Gray,
}

impl Tone {
    pub fn css_color(self) -> &'static str {
        match self {
            Tone::Green => "#2e7d32",
            Tone::Blue => "#1565c0",
            Tone::Orange => "#ef6c00",
            Tone::Red => "#c62828",
            Tone::Gray => "#616161",
        }
    }
}

/// Advice for the four known segments, plus the fallback for any other label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    Vvip,
    Vip,
    Regular,
    Lost,
    Other,
}

impl Advisory {
    pub fn for_segment(label: &str) -> Self {
        match label {
            "VVIP Customers" => Advisory::Vvip,
            "VIP Customers" => Advisory::Vip,
            "Regular Customers" => Advisory::Regular,
            "Lost Customers" => Advisory::Lost,
            _ => Advisory::Other,
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Advisory::Vvip => "🌟",
            Advisory::Vip => "📊",
            Advisory::Regular => "💡",
            Advisory::Lost => "⚠️",
            Advisory::Other => "📌",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            Advisory::Vvip => Tone::Green,
            Advisory::Vip => Tone::Blue,
            Advisory::Regular => Tone::Orange,
            Advisory::Lost => Tone::Red,
            Advisory::Other => Tone::Gray,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Advisory::Vvip => "Focus on retention programs and VIP experiences. These customers generate the highest revenue.",
            Advisory::Vip => "Target with upselling campaigns. They have potential to move to high-value segment.",
            Advisory::Regular => "Engage with educational content and entry-level offers to build loyalty.",
            Advisory::Lost => "Implement win-back campaigns immediately with special discounts.",
            Advisory::Other => "Analyze this segment further.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightCard {
    pub segment: String,
    pub advisory: Advisory,
}

/// Either a grid of cards or a single notice when segments are unavailable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightPanel {
    Grid(Vec<Vec<InsightCard>>),
    Notice(&'static str),
}

impl InsightPanel {
    /// Lay out one card per segment, `CARDS_PER_ROW` to a row, in the given order.
    ///
    /// `None` means the table has no Segment column.
    pub fn build(segments: Option<&[String]>) -> Self {
        let Some(segments) = segments else {
            return InsightPanel::Notice(NO_SEGMENT_NOTICE);
        };
        let rows = segments
            .chunks(CARDS_PER_ROW)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|segment| InsightCard {
                        segment: segment.clone(),
                        advisory: Advisory::for_segment(segment),
                    })
                    .collect()
            })
            .collect();
        InsightPanel::Grid(rows)
    }
}
