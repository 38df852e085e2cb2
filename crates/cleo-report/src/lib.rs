//! Cleo Report — renders the stored graph as a self-contained HTML page.

pub mod report;
pub mod template;

pub use report::{
    generate_html_report, render, render_graph, write_report, LinkPayload, NodePayload,
    REPORT_TITLE,
};
