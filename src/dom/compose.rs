//! Declarative composition of a [`Dashboard`] into a [`Document`].

use super::{Align, BoxStyle, ContainerId, Document, Node, NodeKind, TableNode};
use crate::chart::{self, Rgba};
use crate::data::{format_number, format_percent, Card, Dashboard, Direction, Theme, Widget};
use crate::Result;

/// Id of the download control, which sits outside the captured root.
pub const DOWNLOAD_BUTTON_ID: &str = "download-button";
pub const DOWNLOAD_BUTTON_LABEL: &str = "Download Dashboard as Image (PNG)";

const CARD_MIN_WIDTH: u32 = 340;

/// Parsed theme colours.
struct Palette {
    background: Rgba,
    card: Rgba,
    text: Rgba,
    muted: Rgba,
    accent: Rgba,
    header_background: Rgba,
    header_text: Rgba,
    stripe: Rgba,
    label: Rgba,
}

impl Palette {
    fn from_theme(theme: &Theme) -> Result<Self> {
        Ok(Self {
            background: Rgba::parse(&theme.background)?,
            card: Rgba::parse(&theme.card_background)?,
            text: Rgba::parse(&theme.text)?,
            muted: Rgba::parse(&theme.muted)?,
            accent: Rgba::parse(&theme.accent)?,
            header_background: Rgba::parse(&theme.header_background)?,
            header_text: Rgba::parse(&theme.header_text)?,
            stripe: Rgba::parse(&theme.stripe)?,
            label: Rgba::parse(&theme.label)?,
        })
    }
}

/// Build the render tree for `dashboard`: a page heading, the
/// `dashboard-root` container with one card per widget, and the download
/// button below it.
pub fn document_for(dashboard: &Dashboard) -> Result<Document> {
    let pal = Palette::from_theme(&dashboard.theme)?;

    let mut sections = Vec::with_capacity(dashboard.sections.len() + 1);
    for section in &dashboard.sections {
        let cards = section
            .cards
            .iter()
            .map(|c| card_node(c, &pal))
            .collect::<Result<Vec<_>>>()?;
        sections.push(match section.direction {
            Direction::Row => Node::row(32, CARD_MIN_WIDTH, cards),
            Direction::Column => Node::block(
                BoxStyle {
                    gap: 24,
                    ..Default::default()
                },
                cards,
            ),
        });
    }
    if !dashboard.footer.is_empty() {
        let lines = dashboard
            .footer
            .iter()
            .map(|l| Node::text(l, pal.muted, 1, Align::Start))
            .collect();
        sections.push(Node::block(
            BoxStyle {
                gap: 6,
                ..Default::default()
            },
            lines,
        ));
    }

    let root = Node::block(
        BoxStyle {
            gap: 38,
            ..Default::default()
        },
        sections,
    )
    .with_id(ContainerId::DASHBOARD_ROOT);

    let button = Node::new(NodeKind::Button {
        label: DOWNLOAD_BUTTON_LABEL.to_string(),
        background: pal.accent,
        color: Rgba::WHITE,
    })
    .with_id(DOWNLOAD_BUTTON_ID);

    let page = Node::block(
        BoxStyle {
            background: Some(pal.background),
            padding: 32,
            gap: 30,
            ..Default::default()
        },
        vec![
            Node::text(&dashboard.title, pal.text, 3, Align::Center),
            root,
            Node::block(
                BoxStyle {
                    align: Align::Center,
                    ..Default::default()
                },
                vec![button],
            ),
        ],
    );

    Ok(Document::new(&dashboard.title, page))
}

fn card_style(background: Rgba) -> BoxStyle {
    BoxStyle {
        background: Some(background),
        padding: 24,
        radius: 15,
        gap: 12,
        ..Default::default()
    }
}

fn card_node(card: &Card, pal: &Palette) -> Result<Node> {
    let mut style = card_style(pal.card);
    let mut children = Vec::new();
    if let Some(title) = &card.title {
        let color = match &card.accent {
            Some(c) => Rgba::parse(c)?,
            None => pal.text,
        };
        children.push(Node::text(title, color, 2, Align::Start));
    }

    match &card.widget {
        Widget::SummaryTable(table) => {
            let mut headers = vec![String::new()];
            headers.extend(table.headers.iter().cloned());
            let rows = table
                .rows
                .iter()
                .map(|r| {
                    std::iter::once(r.label.clone())
                        .chain(r.values.iter().map(|v| format_number(*v)))
                        .collect()
                })
                .collect();
            children.push(Node::new(NodeKind::Table(TableNode {
                headers,
                rows,
                header_background: pal.header_background,
                header_text: pal.header_text,
                text: pal.text,
                label_color: Some(pal.label),
                stripe: None,
                rule: Some(pal.stripe),
            })));
        }
        Widget::DonutGauges { gauges } => {
            style.align = Align::Center;
            let cells = gauges
                .iter()
                .map(|g| {
                    let color = Rgba::parse(&g.color)?;
                    Ok(Node::block(
                        BoxStyle {
                            gap: 4,
                            align: Align::Center,
                            ..Default::default()
                        },
                        vec![
                            Node::new(NodeKind::Chart {
                                config: chart::gauge_config(g)?,
                                plot: 90,
                            }),
                            Node::text(&format_percent(g.value), color, 1, Align::Center),
                            Node::text(&g.label, pal.text, 1, Align::Center),
                        ],
                    ))
                })
                .collect::<Result<Vec<_>>>()?;
            children.push(Node::row(32, 0, cells));
        }
        Widget::ProgressBars { items } => {
            let rows = items
                .iter()
                .map(|i| {
                    Ok(Node::new(NodeKind::Progress {
                        label: i.label.clone(),
                        value: i.value,
                        color: Rgba::parse(&i.color)?,
                        track: pal.stripe,
                    }))
                })
                .collect::<Result<Vec<_>>>()?;
            children.push(Node::block(
                BoxStyle {
                    gap: 19,
                    ..Default::default()
                },
                rows,
            ));
        }
        Widget::LayeredDonut { chart: layered, caption } => {
            style.align = Align::Center;
            let mut inner = vec![Node::new(NodeKind::Chart {
                config: chart::layered_config(layered)?,
                plot: 300,
            })];
            if let Some(caption) = caption {
                inner.push(Node::text(caption, pal.muted, 1, Align::Center));
            }
            children.push(Node::block(
                BoxStyle {
                    gap: 14,
                    align: Align::Center,
                    max_width: Some(410),
                    ..Default::default()
                },
                inner,
            ));
        }
        Widget::StatCard(stat) => {
            children.push(Node::text(&stat.label, pal.text, 2, Align::Start));
            children.push(Node::text(&format_number(stat.value), pal.text, 4, Align::Start));
            if let Some(note) = &stat.note {
                children.push(Node::text(note, pal.accent, 1, Align::Start));
            }
        }
        Widget::Insight { text } => {
            style = BoxStyle {
                background: Some(pal.accent),
                padding: 12,
                radius: 12,
                ..Default::default()
            };
            children.push(Node::text(text, pal.card, 1, Align::Start));
        }
        Widget::PieChart(series) => {
            children.push(Node::new(NodeKind::Chart {
                config: chart::pie_config(series, pal.text)?,
                plot: 220,
            }));
        }
        Widget::BarChart(series) => {
            children.push(Node::new(NodeKind::Chart {
                config: chart::bar_config(series, pal.text)?,
                plot: 200,
            }));
        }
        Widget::Table(table) => {
            children.push(Node::new(NodeKind::Table(TableNode {
                headers: table.headers.clone(),
                rows: table.rows.clone(),
                header_background: pal.header_background,
                header_text: pal.header_text,
                text: pal.text,
                label_color: None,
                stripe: Some(pal.stripe),
                rule: Some(pal.header_text),
            })));
        }
        Widget::Note { lines } => {
            for line in lines {
                children.push(Node::text(line, pal.muted, 1, Align::Start));
            }
        }
    }

    Ok(Node::block(style, children))
}
