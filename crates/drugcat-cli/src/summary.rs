use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use drugcat_core::SourceClassification;
use drugcat_core::classify::Evidence;
use drugcat_model::TableKind;

use crate::types::RunResult;

pub fn print_summary(result: &RunResult) {
    println!("Sources: {}", result.source_dir.display());
    if result.dry_run {
        println!("Output: {} (dry run, nothing written)", result.output_dir.display());
    } else {
        println!("Output: {}", result.output_dir.display());
    }

    println!("{}", sources_table(&result.report.sources));
    let unclassified = result.report.sources_of(TableKind::Unclassified);
    if unclassified > 0 {
        eprintln!("{unclassified} unclassified source(s) ignored");
    }

    let mut artifacts = Table::new();
    artifacts.set_header(vec![
        header_cell("Artifact"),
        header_cell("Rows"),
        header_cell("Written"),
    ]);
    apply_summary_table_style(&mut artifacts);
    align_column(&mut artifacts, 1, CellAlignment::Right);
    align_column(&mut artifacts, 2, CellAlignment::Center);
    for artifact in &result.artifacts {
        artifacts.add_row(vec![
            Cell::new(artifact.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(artifact.rows),
            match artifact.path {
                Some(_) => Cell::new("✓")
                    .fg(Color::Green)
                    .add_attribute(Attribute::Bold),
                None => dim_cell("-"),
            },
        ]);
    }
    println!("{artifacts}");

    print_price_table(result);
    print_dictionary_table(result);

    if !result.skipped.is_empty() {
        eprintln!("Skipped sources:");
        for (path, reason) in &result.skipped {
            eprintln!("- {}: {reason}", path.display());
        }
    }
}

fn print_price_table(result: &RunResult) {
    let stats = &result.report.prices;
    let catalog = &result.report.catalog;
    let ingredients = &result.report.ingredients;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Stage"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let rows: [(&str, usize, Option<Color>); 12] = [
        ("catalog entries", catalog.entries, None),
        ("synthesized ids", catalog.synthesized_ids, None),
        ("duplicate product rows", catalog.duplicates, Some(Color::Yellow)),
        ("orphan ingredients", ingredients.orphans, Some(Color::Yellow)),
        ("price observations", stats.observations, None),
        (
            "unparseable prices",
            result.report.observations.unparseable_prices,
            Some(Color::Yellow),
        ),
        ("matched by id", stats.exact_id, None),
        ("matched by brand+form", stats.brand_form, None),
        ("matched by brand", stats.brand, None),
        ("unmatched", stats.unmatched, Some(Color::Yellow)),
        (
            "dropped dates",
            stats.invalid_dates + stats.missing_dates,
            Some(Color::Yellow),
        ),
        ("znvlp flagged", result.report.znvlp_flagged, None),
    ];
    for (label, count, warn_color) in rows {
        let count_cell = match warn_color {
            Some(color) if count > 0 => Cell::new(count).fg(color).add_attribute(Attribute::Bold),
            Some(_) => dim_cell(count),
            None => Cell::new(count),
        };
        table.add_row(vec![Cell::new(label), count_cell]);
    }
    println!("{table}");
}

fn print_dictionary_table(result: &RunResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dictionary"),
        header_cell("Entries"),
        header_cell("SHA-256"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for source in &result.dictionaries {
        let hash = match &source.sha256 {
            Some(hash) => Cell::new(&hash[..hash.len().min(12)]),
            None => dim_cell("identity"),
        };
        table.add_row(vec![
            Cell::new(source.domain.as_str()),
            Cell::new(source.entries),
            hash,
        ]);
    }
    println!("{table}");
}

pub fn print_classification(sources: &[SourceClassification]) {
    println!("{}", sources_table(sources));
}

fn sources_table(sources: &[SourceClassification]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Kind"),
        header_cell("By"),
        header_cell("Rows"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for source in sources {
        table.add_row(vec![
            Cell::new(&source.source),
            kind_cell(source.kind),
            dim_cell(evidence_label(source.evidence)),
            Cell::new(source.rows),
        ]);
    }
    table
}

fn kind_cell(kind: TableKind) -> Cell {
    match kind {
        TableKind::Products => Cell::new(kind).fg(Color::Green),
        TableKind::Compositions => Cell::new(kind).fg(Color::Blue),
        TableKind::Prices => Cell::new(kind).fg(Color::Magenta),
        TableKind::Unclassified => dim_cell(kind),
    }
}

fn evidence_label(evidence: Evidence) -> &'static str {
    match evidence {
        Evidence::Columns => "columns",
        Evidence::SourceName => "name",
        Evidence::Override => "override",
        Evidence::None => "-",
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
