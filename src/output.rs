//! CLI output formatting.
//!
//! Each kind of output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.
//!
//! ## Run
//!
//! ```text
//! Generating 3 cards
//! 001 calm the storm.png → twitter 1200x628
//!     Source: 2000x1000
//!     Crop: (45, 0, 1955, 1000) → resize 1200x628
//!     Saved: out/twitter-calm-the-storm.png
//! 002 missing.png
//!     Error: Source not found: images/missing.png
//!
//! Processed: 1/2 images
//!
//! Errors:
//!   - missing.png: Source not found: images/missing.png
//! ```

use crate::imaging::{CardPlan, ImageSize};
use crate::process::{BatchReport, ProcessEvent};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Describe a plan's steps on one line.
pub fn describe_plan(plan: &CardPlan) -> String {
    match plan {
        CardPlan::CropThenResize { crop, size } => {
            if crop.size() == *size && crop.left == 0 && crop.top == 0 {
                format!("No crop → resize {size}")
            } else {
                format!("Crop: {crop} → resize {size}")
            }
        }
        CardPlan::ResizeThenCrop(fit) => {
            if fit.needs_crop() {
                format!("Resize {} → crop: {}", fit.scaled, fit.crop)
            } else {
                format!("Resize {} (no crop)", fit.final_size)
            }
        }
    }
}

/// Format one progress event.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::BatchStarted { total } => {
            let noun = if *total == 1 { "card" } else { "cards" };
            vec![format!("Generating {total} {noun}")]
        }
        ProcessEvent::CardRendered {
            index,
            item,
            output,
            target,
            source_size,
            plan,
        } => vec![
            format!(
                "{} {} \u{2192} {} {}",
                format_index(*index),
                item,
                target,
                plan.final_size()
            ),
            format!("    Source: {source_size}"),
            format!("    {}", describe_plan(plan)),
            format!("    Saved: {output}"),
        ],
        ProcessEvent::CardFailed {
            index,
            item,
            reason,
        } => vec![
            format!("{} {}", format_index(*index), item),
            format!("    Error: {reason}"),
        ],
    }
}

/// Format the end-of-run summary.
pub fn format_summary(report: &BatchReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Processed: {}/{} images",
        report.processed, report.total
    )];
    if !report.failures.is_empty() {
        lines.push(String::new());
        lines.push("Errors:".to_string());
        for failure in &report.failures {
            lines.push(format!("  - {}: {}", failure.item, failure.reason));
        }
    }
    lines
}

/// Format the geometry for a single source size (the `plan` command).
pub fn format_plan(source: ImageSize, target: ImageSize, plan: &CardPlan) -> Vec<String> {
    vec![
        format!("Source: {source} (ratio {:.3})", source.ratio()),
        format!("Target: {target} (ratio {:.3})", target.ratio()),
        describe_plan(plan),
    ]
}

pub fn print_summary(report: &BatchReport) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}

pub fn print_plan(source: ImageSize, target: ImageSize, plan: &CardPlan) {
    for line in format_plan(source, target, plan) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{CropBox, FitResult, fit_exact};
    use crate::process::Failure;

    #[test]
    fn batch_started_pluralizes() {
        assert_eq!(
            format_process_event(&ProcessEvent::BatchStarted { total: 1 }),
            vec!["Generating 1 card"]
        );
        assert_eq!(
            format_process_event(&ProcessEvent::BatchStarted { total: 11 }),
            vec!["Generating 11 cards"]
        );
    }

    #[test]
    fn rendered_card_lines() {
        let plan = CardPlan::CropThenResize {
            crop: CropBox {
                left: 45,
                top: 0,
                right: 1955,
                bottom: 1000,
            },
            size: ImageSize::new(1200, 628),
        };
        let lines = format_process_event(&ProcessEvent::CardRendered {
            index: 1,
            item: "calm the storm.png".to_string(),
            output: "out/twitter-calm-the-storm.png".to_string(),
            target: "twitter".to_string(),
            source_size: ImageSize::new(2000, 1000),
            plan,
        });

        assert_eq!(lines[0], "001 calm the storm.png \u{2192} twitter 1200x628");
        assert_eq!(lines[1], "    Source: 2000x1000");
        assert_eq!(lines[2], "    Crop: (45, 0, 1955, 1000) \u{2192} resize 1200x628");
        assert_eq!(lines[3], "    Saved: out/twitter-calm-the-storm.png");
    }

    #[test]
    fn failed_card_lines() {
        let lines = format_process_event(&ProcessEvent::CardFailed {
            index: 12,
            item: "gone.png".to_string(),
            reason: "Source not found: gone.png".to_string(),
        });
        assert_eq!(lines, vec!["012 gone.png", "    Error: Source not found: gone.png"]);
    }

    #[test]
    fn describe_fill_plans() {
        let fit = fit_exact(ImageSize::new(1000, 1000), ImageSize::new(1200, 628)).unwrap();
        assert_eq!(
            describe_plan(&CardPlan::ResizeThenCrop(fit)),
            "Resize 1200x1200 \u{2192} crop: (0, 286, 1200, 914)"
        );

        let size = ImageSize::new(1200, 628);
        let identity = CardPlan::ResizeThenCrop(FitResult {
            scaled: size,
            crop: CropBox::full(size),
            final_size: size,
        });
        assert_eq!(describe_plan(&identity), "Resize 1200x628 (no crop)");
    }

    #[test]
    fn describe_uncropped_ratio_plan() {
        let plan = CardPlan::CropThenResize {
            crop: CropBox::full(ImageSize::new(2400, 1256)),
            size: ImageSize::new(1200, 628),
        };
        // Full-extent crop of a larger source is still reported as a crop box
        assert_eq!(
            describe_plan(&plan),
            "Crop: (0, 0, 2400, 1256) \u{2192} resize 1200x628"
        );

        let same = CardPlan::CropThenResize {
            crop: CropBox::full(ImageSize::new(1200, 628)),
            size: ImageSize::new(1200, 628),
        };
        assert_eq!(describe_plan(&same), "No crop \u{2192} resize 1200x628");
    }

    #[test]
    fn summary_without_errors() {
        let report = BatchReport {
            processed: 11,
            total: 11,
            failures: vec![],
        };
        assert_eq!(format_summary(&report), vec!["Processed: 11/11 images"]);
    }

    #[test]
    fn summary_lists_errors() {
        let report = BatchReport {
            processed: 1,
            total: 2,
            failures: vec![Failure {
                item: "gone.png".to_string(),
                kind: "source_not_found",
                reason: "Source not found: img/gone.png".to_string(),
            }],
        };
        assert_eq!(
            format_summary(&report),
            vec![
                "Processed: 1/2 images",
                "",
                "Errors:",
                "  - gone.png: Source not found: img/gone.png",
            ]
        );
    }

    #[test]
    fn plan_output_includes_ratios() {
        let fit = fit_exact(ImageSize::new(1000, 1000), ImageSize::new(1200, 628)).unwrap();
        let lines = format_plan(
            ImageSize::new(1000, 1000),
            ImageSize::new(1200, 628),
            &CardPlan::ResizeThenCrop(fit),
        );
        assert_eq!(lines[0], "Source: 1000x1000 (ratio 1.000)");
        assert_eq!(lines[1], "Target: 1200x628 (ratio 1.911)");
    }
}
