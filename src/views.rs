// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTML pages.
//!
//! Views take already-computed data and return a complete HTML document.
//! All dynamic text goes through `html_escape`.

use crate::models::{ActivityComparison, SegmentInfo};
use html_escape::{encode_double_quoted_attribute, encode_text};

const STYLE: &str = "body{font-family:sans-serif;max-width:48em;margin:2em auto;padding:0 1em}\
table{border-collapse:collapse;width:100%}\
th,td{padding:.4em .6em;border-bottom:1px solid #ddd;text-align:left}\
td.num,th.num{text-align:right}\
.slower{color:#b00}.faster{color:#070}";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        encode_text(title),
        STYLE,
        body
    )
}

/// Input form asking for an optional activity ID.
pub fn input_page(athlete_name: Option<&str>) -> String {
    let greeting = match athlete_name {
        Some(name) => format!("<p>Signed in as {}.</p>", encode_text(name)),
        None => String::new(),
    };

    let body = format!(
        "<h1>Segment PR Comparison</h1>\n{}\n\
         <form action=\"/results/\" method=\"get\">\n\
         <label for=\"activity_id\">Activity ID</label>\n\
         <input type=\"text\" id=\"activity_id\" name=\"activity_id\" inputmode=\"numeric\" \
         placeholder=\"Leave blank for your latest activity\">\n\
         <button type=\"submit\">Compare</button>\n\
         </form>\n<p><a href=\"/auth/logout\">Log out</a></p>",
        greeting
    );
    layout("Segment PR Comparison", &body)
}

/// Results table: one row per segment effort.
pub fn results_page(comparison: &ActivityComparison) -> String {
    let heading = if comparison.activity_name.is_empty() {
        format!("Activity {}", comparison.activity_id)
    } else {
        comparison.activity_name.clone()
    };

    let table = if comparison.segments.is_empty() {
        "<p>This activity has no segment efforts.</p>".to_string()
    } else {
        let rows: String = comparison.segments.iter().map(result_row).collect();
        format!(
            "<table>\n<thead><tr><th>Segment</th><th class=\"num\">Time</th>\
             <th class=\"num\">PR</th><th class=\"num\">% of PR</th></tr></thead>\n\
             <tbody>\n{}</tbody>\n</table>",
            rows
        )
    };

    let body = format!(
        "<h1>{}</h1>\n<p>Activity <a href=\"https://www.strava.com/activities/{}\">{}</a></p>\n\
         {}\n<p><a href=\"/\">Compare another activity</a></p>",
        encode_text(&heading),
        comparison.activity_id,
        comparison.activity_id,
        table
    );
    layout(&heading, &body)
}

fn result_row(info: &SegmentInfo) -> String {
    let pr = info
        .pr_time
        .map(format_duration)
        .unwrap_or_else(|| "n/a".to_string());
    let (pct, class) = match info.percentage {
        Some(p) if p > 100 => (format!("{}%", p), " slower"),
        Some(p) if p < 100 => (format!("{}%", p), " faster"),
        Some(p) => (format!("{}%", p), ""),
        None => ("n/a".to_string(), ""),
    };

    format!(
        "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td>\
         <td class=\"{}\">{}</td></tr>\n",
        encode_text(&info.name),
        format_duration(info.elapsed_time),
        pr,
        encode_double_quoted_attribute(&format!("num{}", class)),
        pct
    )
}

/// Error page with a title and an explanation.
pub fn error_page(title: &str, detail: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n<div>{}</div>\n<p><a href=\"/\">Back</a></p>",
        encode_text(title),
        encode_text(detail)
    );
    layout(title, &body)
}

/// Format seconds as `m:ss`, or `h:mm:ss` for an hour or more.
pub fn format_duration(seconds: u32) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}
