//! Line oriented text adapters: edge lists in, partitions and metrics out.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use itertools::Itertools;

use crate::graph::Graph;
use crate::types::{CommID, Partition};

/// Turn the escape sequences a shell leaves untouched (`\t`, `\s`) into the
/// characters they name. Anything else is used verbatim.
pub fn unescape_delimiter(delimiter: &str) -> String {
    match delimiter {
        "\\t" => "\t".to_string(),
        "\\s" => " ".to_string(),
        other => other.to_string(),
    }
}

/// Build a graph from an edge list. Each line holds two vertex names split by
/// `delimiter`; blank lines, `#` comments and lines with fewer than two tokens
/// are skipped. Empty tokens (repeated or trailing delimiters) do not count.
/// Extra tokens are ignored.
pub fn parse_edge_list<R: BufRead>(reader: R, delimiter: &str) -> Result<Graph> {
    if delimiter.is_empty() {
        bail!("edge list delimiter must not be empty");
    }
    let mut graph = Graph::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", line_no + 1))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line
            .split(delimiter)
            .map(str::trim)
            .filter(|token| !token.is_empty());
        if let (Some(a), Some(b)) = (tokens.next(), tokens.next()) {
            graph.add_edge_by_name(a, b);
        }
    }
    Ok(graph)
}

pub fn load_edge_list(path: impl AsRef<Path>, delimiter: &str) -> Result<Graph> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open edge list {}", path.display()))?;
    parse_edge_list(BufReader::new(file), delimiter)
        .with_context(|| format!("failed to load edge list {}", path.display()))
}

/// Write `name<TAB>community` for every vertex in id order.
pub fn write_partition<W: Write>(graph: &Graph, partition: &Partition, writer: &mut W) -> Result<()> {
    for (vertex, community) in partition.iter() {
        let name = graph
            .vertex_name(vertex)
            .with_context(|| format!("partition names unknown vertex {}", vertex))?;
        writeln!(writer, "{}\t{}", name, community)?;
    }
    Ok(())
}

/// Read back what [`write_partition`] wrote, resolving names against `graph`.
pub fn parse_partition<R: BufRead>(graph: &Graph, reader: R) -> Result<Partition> {
    let mut partition = Partition::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let Some((name, community)) = line.rsplit_once('\t') else {
            bail!("line {}: expected '<vertex>\\t<community>'", line_no + 1);
        };
        let vertex = graph
            .vertex_id(name)
            .with_context(|| format!("line {}: unknown vertex '{}'", line_no + 1, name))?;
        let community: CommID = community
            .trim()
            .parse()
            .with_context(|| format!("line {}: bad community id '{}'", line_no + 1, community))?;
        partition.assign(vertex, community);
    }
    Ok(partition)
}

pub fn write_metrics<W: Write>(modularity: f64, writer: &mut W) -> Result<()> {
    writeln!(writer, "modularity\t{}", modularity)?;
    Ok(())
}

/// Write `<prefix>_partition.txt` and `<prefix>_metrics.txt`, creating the
/// prefix's directory if needed. Returns the two paths.
pub fn write_results(
    prefix: &str,
    graph: &Graph,
    partition: &Partition,
    modularity: f64,
) -> Result<(String, String)> {
    if let Some(dir) = Path::new(prefix).parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("failed to create directory {}", dir.display()))?;
    }
    let partition_path = format!("{}_partition.txt", prefix);
    let metrics_path = format!("{}_metrics.txt", prefix);

    let mut writer = BufWriter::new(
        File::create(&partition_path).with_context(|| format!("failed to create {}", partition_path))?,
    );
    write_partition(graph, partition, &mut writer)?;
    writer.flush()?;

    let mut writer = BufWriter::new(
        File::create(&metrics_path).with_context(|| format!("failed to create {}", metrics_path))?,
    );
    write_metrics(modularity, &mut writer)?;
    writer.flush()?;

    Ok((partition_path, metrics_path))
}

/// One line per community, member names joined by spaces. Used for logging.
pub fn describe_partition(graph: &Graph, partition: &Partition) -> String {
    partition
        .communities()
        .iter()
        .map(|(community, members)| {
            format!(
                "{}: {}",
                community,
                members.iter().filter_map(|&v| graph.vertex_name(v)).join(" ")
            )
        })
        .join("\n")
}
