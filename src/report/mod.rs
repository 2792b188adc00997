//! # Candidate Reports
//!
//! Builds a [`ReportDocument`] from already-fetched candidate records:
//! profile, performance metrics, skill gaps, strengths and weaknesses,
//! training recommendations, industry analysis and predictive analytics.
//!
//! Column widths come from the page's content width, so the same report
//! lays out on any page size. Sections with no data are left out.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::model::{
    CardSpec, Metadata, PageFooter, PageHeader, PageMetrics, ReportDocument, Section,
};
use crate::style::{Color, LayoutOptions, Palette};

/// Stat cards per row.
const STATS_PER_ROW: usize = 4;

/// Header colors stat cards cycle through when a metric names none.
const STAT_COLORS: [Color; 4] = [
    Palette::PRIMARY,
    Palette::SUCCESS,
    Palette::WARNING,
    Palette::INFO,
];

/// Everything known about one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateReport {
    pub candidate_id: String,
    pub profile: CandidateProfile,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub skill_gaps: Vec<SkillGap>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub industry: Option<IndustryAnalysis>,
    #[serde(default)]
    pub predictions: Option<PredictiveAnalytics>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub experience_years: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// One headline number, drawn as a small stat card.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGap {
    pub skill: String,
    pub current: f64,
    pub target: f64,
}

impl SkillGap {
    pub fn gap(&self) -> f64 {
        (self.target - self.current).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    fn color(&self) -> Color {
        match self {
            Priority::High => Palette::DANGER,
            Priority::Medium => Palette::WARNING,
            Priority::Low => Palette::INFO,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryAnalysis {
    pub industry: String,
    /// Standing among peers in the same industry, 0-100.
    #[serde(default)]
    pub percentile: Option<f64>,
    #[serde(default)]
    pub demand: Option<String>,
    #[serde(default)]
    pub trends: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictiveAnalytics {
    /// Percent, 0-100.
    #[serde(default)]
    pub success_probability: Option<f64>,
    #[serde(default)]
    pub readiness: Option<String>,
    #[serde(default)]
    pub projected_timeline: Option<String>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
}

/// Column widths for one page geometry.
struct Columns {
    full: f64,
    half: f64,
    stat: f64,
}

impl Columns {
    fn new(metrics: &PageMetrics, options: &LayoutOptions) -> Self {
        let full = metrics.content_width();
        let gap = options.column_gap;
        Self {
            full,
            half: (full - gap) / 2.0,
            stat: (full - gap * (STATS_PER_ROW - 1) as f64) / STATS_PER_ROW as f64,
        }
    }
}

impl CandidateReport {
    /// Assemble the report document.
    ///
    /// `generated_at` is footer text only; layout never depends on it.
    pub fn to_document(
        &self,
        metrics: &PageMetrics,
        options: &LayoutOptions,
        generated_at: Option<&str>,
    ) -> ReportDocument {
        let cols = Columns::new(metrics, options);
        let sections: Vec<Section> = [
            Some(self.profile_section(&cols)),
            self.metrics_section(&cols, options),
            self.skill_gap_section(&cols),
            self.strengths_section(&cols),
            self.recommendations_section(&cols),
            self.outlook_section(&cols),
        ]
        .into_iter()
        .flatten()
        .collect();

        let mut document = ReportDocument::new(sections)
            .with_header(PageHeader {
                title: "Candidate Performance Report".to_string(),
                subtitle: Some(self.profile.name.clone()),
            })
            .with_footer(PageFooter {
                text: generated_at.map(|t| format!("Generated on {t}")),
                ..PageFooter::default()
            });
        document.metadata = Metadata {
            title: Some(format!("Candidate Report: {}", self.profile.name)),
            author: None,
            subject: Some(format!("Candidate {}", self.candidate_id)),
        };
        document
    }

    fn profile_section(&self, cols: &Columns) -> Section {
        let p = &self.profile;
        let mut card = CardSpec::new("Candidate Profile", cols.full)
            .header_color(Palette::DARK)
            .body_color(Palette::LIGHT)
            .key_value("Name", &p.name)
            .key_value("Candidate ID", &self.candidate_id);
        if let Some(email) = &p.email {
            card = card.key_value("Email", email);
        }
        if let Some(role) = &p.role {
            card = card.key_value("Target role", role);
        }
        if let Some(years) = p.experience_years {
            card = card.key_value("Experience", format!("{years} years"));
        }
        if let Some(location) = &p.location {
            card = card.key_value("Location", location);
        }
        if let Some(summary) = &p.summary {
            card = card.blank().paragraph(summary);
        }
        Section::new().card(card)
    }

    fn metrics_section(&self, cols: &Columns, options: &LayoutOptions) -> Option<Section> {
        if self.metrics.is_empty() {
            return None;
        }
        // Room for the value and one line of detail.
        let height = options.header_height
            + 2.0 * options.padding
            + 2.0 * options.line_height
            + options.field_gap;

        let mut section = Section::new().heading("Performance Metrics");
        for (row, chunk) in self.metrics.chunks(STATS_PER_ROW).enumerate() {
            let cards = chunk
                .iter()
                .enumerate()
                .map(|(i, metric)| {
                    let color = metric
                        .color
                        .unwrap_or(STAT_COLORS[(row * STATS_PER_ROW + i) % STAT_COLORS.len()]);
                    let card = CardSpec::new(&metric.label, cols.stat)
                        .height(height)
                        .header_color(color)
                        .label(&metric.value);
                    match &metric.detail {
                        Some(detail) => card.paragraph(detail),
                        None => card,
                    }
                })
                .collect();
            section = section.row(cards);
        }
        Some(section)
    }

    fn skill_gap_section(&self, cols: &Columns) -> Option<Section> {
        if self.skill_gaps.is_empty() {
            return None;
        }
        let card = self.skill_gaps.iter().fold(
            CardSpec::new("Skill Gap Analysis", cols.full).header_color(Palette::PURPLE),
            |card, gap| {
                card.key_value(
                    &gap.skill,
                    format!(
                        "{:.0} / {:.0} (gap {:.0})",
                        gap.current,
                        gap.target,
                        gap.gap()
                    ),
                )
            },
        );
        Some(Section::new().card(card))
    }

    fn strengths_section(&self, cols: &Columns) -> Option<Section> {
        if self.strengths.is_empty() && self.weaknesses.is_empty() {
            return None;
        }
        let column = |title: &str, items: &[String], color: Color| {
            let card = CardSpec::new(title, cols.half).header_color(color);
            if items.is_empty() {
                card.paragraph("None recorded.")
            } else {
                card.bullets(items.iter().cloned())
            }
        };
        Some(Section::new().row(vec![
            column("Strengths", &self.strengths, Palette::SUCCESS),
            column("Areas to Improve", &self.weaknesses, Palette::WARNING),
        ]))
    }

    fn recommendations_section(&self, cols: &Columns) -> Option<Section> {
        if self.recommendations.is_empty() {
            return None;
        }
        let section = self.recommendations.iter().fold(
            Section::new().heading("Training Recommendations"),
            |section, rec| {
                let mut card = CardSpec::new(&rec.title, cols.full)
                    .header_color(rec.priority.map_or(Palette::PRIMARY, |p| p.color()));
                if let Some(priority) = rec.priority {
                    card = card.key_value("Priority", priority.label());
                }
                if let Some(description) = &rec.description {
                    card = card.paragraph(description);
                }
                if !rec.resources.is_empty() {
                    card = card.label("Resources").bullets(rec.resources.iter().cloned());
                }
                section.card(card)
            },
        );
        Some(section)
    }

    /// Industry analysis and predictive analytics, side by side when both exist.
    fn outlook_section(&self, cols: &Columns) -> Option<Section> {
        let both = self.industry.is_some() && self.predictions.is_some();
        let width = if both { cols.half } else { cols.full };

        let industry = self.industry.as_ref().map(|ind| {
            let mut card = CardSpec::new("Industry Analysis", width)
                .header_color(Palette::INFO)
                .key_value("Industry", &ind.industry);
            if let Some(p) = ind.percentile {
                card = card.key_value("Peer percentile", format!("{p:.0}th"));
            }
            if let Some(demand) = &ind.demand {
                card = card.key_value("Market demand", demand);
            }
            if !ind.trends.is_empty() {
                card = card.label("Trends").bullets(ind.trends.iter().cloned());
            }
            card
        });

        let predictions = self.predictions.as_ref().map(|pred| {
            let mut card =
                CardSpec::new("Predictive Analytics", width).header_color(Palette::PURPLE);
            if let Some(p) = pred.success_probability {
                card = card.key_value("Success probability", format!("{p:.0}%"));
            }
            if let Some(readiness) = &pred.readiness {
                card = card.key_value("Readiness", readiness);
            }
            if let Some(timeline) = &pred.projected_timeline {
                card = card.key_value("Projected timeline", timeline);
            }
            if !pred.risk_factors.is_empty() {
                card = card.label("Risk factors").bullets(pred.risk_factors.iter().cloned());
            }
            card
        });

        let cards: Vec<CardSpec> = industry.into_iter().chain(predictions).collect();
        match cards.len() {
            0 => None,
            1 => cards
                .into_iter()
                .next()
                .map(|card| Section::new().heading("Outlook").card(card)),
            _ => Some(Section::new().heading("Outlook").row(cards)),
        }
    }

    /// A representative report, used by `reportflow example`.
    pub fn example() -> Self {
        let metric = |label: &str, value: &str, detail: &str| Metric {
            label: label.to_string(),
            value: value.to_string(),
            detail: Some(detail.to_string()),
            color: None,
        };
        let gap = |skill: &str, current: f64, target: f64| SkillGap {
            skill: skill.to_string(),
            current,
            target,
        };
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            candidate_id: "CAND-1042".to_string(),
            profile: CandidateProfile {
                name: "Ada Lovelace".to_string(),
                email: Some("ada@example.com".to_string()),
                role: Some("Backend Engineer".to_string()),
                experience_years: Some(4.0),
                location: Some("London".to_string()),
                summary: Some(
                    "Strong analytical problem solver with a consistent record on \
                     algorithmic assessments and room to grow in system design."
                        .to_string(),
                ),
            },
            metrics: vec![
                metric("Overall Score", "82/100", "Top 15% of cohort"),
                metric("Accuracy", "91%", "Across 48 problems"),
                metric("Avg. Time", "14 min", "Per problem"),
                metric("Streak", "12 days", "Longest: 21"),
                metric("Interviews", "6", "4 passed"),
                metric("Code Quality", "B+", "Reviewer average"),
            ],
            skill_gaps: vec![
                gap("Dynamic Programming", 62.0, 80.0),
                gap("System Design", 55.0, 75.0),
                gap("Graph Algorithms", 70.0, 80.0),
                gap("Concurrency", 48.0, 70.0),
            ],
            strengths: strings(&[
                "Clean, well-tested solutions",
                "Fast on array and string problems",
                "Clear verbal reasoning in interviews",
            ]),
            weaknesses: strings(&[
                "Hesitant on open-ended design questions",
                "Misses edge cases under time pressure",
            ]),
            recommendations: vec![
                Recommendation {
                    title: "System Design Fundamentals".to_string(),
                    description: Some(
                        "Work through capacity estimation, caching and partitioning \
                         case studies, then practise with timed mock interviews."
                            .to_string(),
                    ),
                    priority: Some(Priority::High),
                    resources: strings(&["Designing Data-Intensive Applications", "Mock design interviews (weekly)"]),
                },
                Recommendation {
                    title: "Dynamic Programming Drills".to_string(),
                    description: Some("Two medium DP problems per day for three weeks.".to_string()),
                    priority: Some(Priority::Medium),
                    resources: strings(&["Curated DP problem set"]),
                },
                Recommendation {
                    title: "Concurrency Primer".to_string(),
                    description: None,
                    priority: Some(Priority::Low),
                    resources: Vec::new(),
                },
            ],
            industry: Some(IndustryAnalysis {
                industry: "Financial Technology".to_string(),
                percentile: Some(78.0),
                demand: Some("High".to_string()),
                trends: strings(&["Event-driven architectures", "Real-time risk scoring"]),
            }),
            predictions: Some(PredictiveAnalytics {
                success_probability: Some(74.0),
                readiness: Some("Interview-ready in 6 weeks".to_string()),
                projected_timeline: Some("Senior level in 2-3 years".to_string()),
                risk_factors: strings(&["System design depth"]),
            }),
        }
    }
}

/// File name for a rendered report: `<candidateId>_Report_<YYYYMMDD_HHMMSS>.<ext>`.
///
/// Characters that are unsafe in file names are replaced with `_`.
pub fn report_filename(candidate_id: &str, timestamp: &NaiveDateTime, ext: &str) -> String {
    let id: String = candidate_id
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let id = if id.is_empty() { "candidate".to_string() } else { id };
    format!(
        "{}_Report_{}.{}",
        id,
        timestamp.format("%Y%m%d_%H%M%S"),
        ext.trim_start_matches('.')
    )
}
