use super::*;

fn record(label: &str, values: &[f64]) -> MetricRecord {
    MetricRecord {
        label: label.to_string(),
        values: values.to_vec(),
    }
}

fn gauge(value: f64, color: &str, label: &str) -> DonutSlice {
    DonutSlice {
        value,
        color: color.to_string(),
        label: label.to_string(),
    }
}

fn progress(label: &str, value: f64, color: &str) -> ProgressItem {
    ProgressItem {
        label: label.to_string(),
        value,
        color: color.to_string(),
    }
}

fn layer(name: &str, values: &[f64], colors: &[&str]) -> DonutLayer {
    DonutLayer {
        name: name.to_string(),
        values: values.to_vec(),
        colors: colors.iter().map(|c| c.to_string()).collect(),
    }
}

impl Dashboard {
    /// The light analytics dashboard: summary table, radial gauges, budget
    /// progress rows and a three-layer donut.
    pub fn analytics() -> Dashboard {
        let table = MetricTable {
            headers: vec!["TITLE 1".into(), "TITLE 2".into(), "TITLE 3".into()],
            rows: vec![
                record("DATA 1", &[100.0, 110.0, 120.0]),
                record("DATA 2", &[80.0, 90.0, 95.0]),
                record("DATA 3", &[60.0, 70.0, 75.0]),
                record("DATA 4", &[40.0, 70.0, 60.0]),
                record("DATA 5", &[30.0, 40.0, 50.0]),
            ],
        };

        let gauges = vec![
            gauge(50.0, "#A259F7", "Purple 50%"),
            gauge(25.0, "#1FB5FB", "Blue 25%"),
            gauge(75.0, "#FF4D90", "Pink 75%"),
            gauge(15.0, "#13C5B4", "Teal 15%"),
        ];

        let items = vec![
            progress("JAN", 70.0, "#A259F7"),
            progress("FEB", 55.0, "#FF4D90"),
            progress("MAR", 30.0, "#1FB5FB"),
            progress("APR", 40.0, "#4479F7"),
            progress("MAY", 60.0, "#13C5B4"),
        ];

        let layered = LayeredDonut {
            labels: vec!["Layer 1".into(), "Layer 2".into(), "Layer 3".into()],
            series: vec![
                layer("Layer 1", &[90.0, 80.0, 70.0], &["#A259F7", "#FF4D90", "#1FB5FB"]),
                layer("Layer 2", &[80.0, 70.0, 60.0], &["#7259F7", "#FD4D90", "#19B5FB"]),
                layer("Layer 3", &[70.0, 60.0, 50.0], &["#5259F7", "#FDA090", "#19B9FB"]),
            ],
        };

        Dashboard {
            title: "Dynamic Logistics Dashboard".into(),
            theme: Theme::light(),
            sections: vec![
                Section::row(vec![
                    Card::titled("Summary Table", Some("#A259F7"), Widget::SummaryTable(table)),
                    Card::titled("Radial Breakdown", Some("#FF4D90"), Widget::DonutGauges { gauges }),
                ]),
                Section::column(vec![Card::titled(
                    "Budget Infographic",
                    Some("#4479F7"),
                    Widget::ProgressBars { items },
                )]),
                Section::column(vec![Card::titled(
                    "Multi-Layer Infographic",
                    Some("#19B5FB"),
                    Widget::LayeredDonut {
                        chart: layered,
                        caption: Some("Titles and explanations can go here.".into()),
                    },
                )]),
            ],
            footer: Vec::new(),
        }
    }
}
