//! Text rendering of queue pages

use std::collections::HashMap;

use alloy_primitives::Address;
use queue_core::{CombinedPage, Lane, LanePage, QueueEntry, QueueStatus};

/// Megapool -> node operator lookups resolved for a page
pub type NodeMap = HashMap<Address, Address>;

pub fn lane_marker(lane: Lane) -> &'static str {
    match lane {
        Lane::Express => "🐇",
        Lane::Standard => "🐢",
    }
}

/// Format a milliether amount as ETH, dropping trailing zeros
pub fn format_milliether(amount: u32) -> String {
    let whole = amount / 1000;
    let frac = amount % 1000;
    if frac == 0 {
        return format!("{whole} ETH");
    }
    let frac = format!("{frac:03}");
    format!("{whole}.{} ETH", frac.trim_end_matches('0'))
}

fn owner_label(entry: &QueueEntry, nodes: &NodeMap) -> String {
    match nodes.get(&entry.owner_address) {
        Some(node) => format!("{node}"),
        None => format!("{}", entry.owner_address),
    }
}

fn entry_line(position: u64, marker: Option<&str>, entry: &QueueEntry, nodes: &NodeMap) -> String {
    let owner = owner_label(entry, nodes);
    match marker {
        Some(marker) => format!("{position}. {marker} {owner} #{}", entry.slot_id),
        None => format!("{position}. {owner} #{}", entry.slot_id),
    }
}

fn join_lines(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Numbered entries of a single lane page, 1-based positions
pub fn render_lane_page(page: &LanePage, nodes: &NodeMap) -> String {
    let lines = page
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| entry_line(page.start + i as u64 + 1, None, entry, nodes))
        .collect();
    join_lines(lines)
}

/// Numbered entries of a combined page with their lane markers
pub fn render_combined_page(page: &CombinedPage, nodes: &NodeMap) -> String {
    let lines = page
        .entries
        .iter()
        .enumerate()
        .map(|(i, tagged)| {
            let marker = lane_marker(tagged.lane);
            entry_line(page.start + i as u64 + 1, Some(marker), &tagged.entry, nodes)
        })
        .collect();
    join_lines(lines)
}

/// Header line shown above a page
pub fn page_header(title: &str, page_index: u64, page_size: u64, total: u64) -> String {
    let pages = total.div_ceil(page_size.max(1)).max(1);
    format!("{title} ({total} validators), page {}/{pages}", page_index + 1)
}

pub fn render_status(status: &QueueStatus) -> String {
    let mut lines = Vec::new();
    if let Some(block) = status.block {
        lines.push(format!("Block:            {block}"));
    }
    lines.push(format!("Queue index:      {}", status.cursor.queue_index));
    lines.push(format!(
        "Express rate:     {} express per standard",
        status.cursor.rate
    ));
    for lane in Lane::ALL {
        lines.push(format!(
            "{} {:<9} {} queued (namespace {})",
            lane_marker(lane),
            lane.to_string(),
            status.lengths.get(lane),
            lane.namespace_hex()
        ));
    }
    lines.push(format!("Total:            {}", status.lengths.total()));
    join_lines(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use queue_core::{LaneCounts, QueueCursor, TaggedEntry};

    fn entry(id: u32) -> QueueEntry {
        QueueEntry::new(Address::repeat_byte(0xab), id, 4_000, 32_000)
    }

    #[test]
    fn test_format_milliether() {
        assert_eq!(format_milliether(4_000), "4 ETH");
        assert_eq!(format_milliether(32_000), "32 ETH");
        assert_eq!(format_milliether(1_500), "1.5 ETH");
        assert_eq!(format_milliether(2_025), "2.025 ETH");
        assert_eq!(format_milliether(0), "0 ETH");
    }

    #[test]
    fn test_lane_page_positions_continue_from_start() {
        let page = LanePage {
            lane: Lane::Standard,
            total_length: 40,
            start: 15,
            entries: vec![entry(3), entry(9)],
            block: None,
        };
        let text = render_lane_page(&page, &NodeMap::new());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("16. "));
        assert!(lines[0].ends_with("#3"));
        assert!(lines[1].starts_with("17. "));
    }

    #[test]
    fn test_combined_page_uses_node_labels() {
        let node = Address::repeat_byte(0xcd);
        let mut nodes = NodeMap::new();
        nodes.insert(Address::repeat_byte(0xab), node);

        let page = CombinedPage {
            total_length: 2,
            start: 0,
            cursor: QueueCursor::new(0, 2),
            lengths: LaneCounts::new(1, 1),
            entries: vec![
                TaggedEntry {
                    lane: Lane::Express,
                    entry: entry(1),
                },
                TaggedEntry {
                    lane: Lane::Standard,
                    entry: entry(2),
                },
            ],
            block: Some(10),
        };
        let text = render_combined_page(&page, &nodes);
        assert!(text.contains(&format!("1. 🐇 {node} #1")));
        assert!(text.contains(&format!("2. 🐢 {node} #2")));
    }

    #[test]
    fn test_page_header() {
        assert_eq!(
            page_header("Validator Queue", 0, 15, 31),
            "Validator Queue (31 validators), page 1/3"
        );
        assert_eq!(page_header("Validator Queue", 0, 15, 0), "Validator Queue (0 validators), page 1/1");
    }

    #[test]
    fn test_status_shows_pinned_block() {
        let status = QueueStatus {
            cursor: QueueCursor::new(120, 2),
            lengths: LaneCounts::new(4, 9),
            block: Some(21_000_000),
        };
        let text = render_status(&status);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Block:            21000000");
        assert_eq!(lines[1], "Queue index:      120");
        assert_eq!(lines.last(), Some(&"Total:            13"));
        assert!(text.ends_with('\n'));

        let unpinned = render_status(&QueueStatus { block: None, ..status });
        assert!(unpinned.starts_with("Queue index:"));
    }

    #[test]
    fn test_empty_page_renders_nothing() {
        let page = LanePage {
            lane: Lane::Express,
            total_length: 0,
            start: 0,
            entries: Vec::new(),
            block: None,
        };
        assert_eq!(render_lane_page(&page, &NodeMap::new()), "");
    }
}
