//! A line-oriented text dump of a graph, so it can be reloaded without parsing the route file
//! again. It's a debugging checkpoint, not an interchange format.
//!
//! ```text
//! WAYPOINT-GRAPH 1 utm 14 620000 3350000
//! <number of nodes>
//! <number of edges>
//! N seg lane pt index lat lon x y width entry exit goal lane_change spot stop perimeter checkpoint
//! ...
//! E u v left right distance speed_min speed_max exit implicit blocked
//! ...
//! ```

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use geom::{Distance, LonLat, Pt2D};

use crate::{ElementID, Frame, Graph, NodeIndex, WayPointEdge, WayPointNode};

const MAGIC: &str = "WAYPOINT-GRAPH";
const VERSION: &str = "1";

pub fn save(graph: &Graph, path: &str) -> Result<()> {
    let mut f = BufWriter::new(fs_err::File::create(path)?);
    write_snapshot(graph, &mut f)?;
    f.flush()?;
    info!("Saved graph snapshot to {}", path);
    Ok(())
}

pub fn load(path: &str) -> Result<Graph> {
    let f = BufReader::new(fs_err::File::open(path)?);
    read_snapshot(f).with_context(|| format!("reading snapshot {}", path))
}

pub fn write_snapshot<W: Write>(graph: &Graph, w: &mut W) -> Result<()> {
    match graph.frame() {
        Some(Frame::Utm {
            zone,
            origin_easting,
            origin_northing,
        }) => writeln!(
            w,
            "{} {} utm {} {} {}",
            MAGIC, VERSION, zone, origin_easting, origin_northing
        )?,
        Some(Frame::Planar) => writeln!(w, "{} {} planar", MAGIC, VERSION)?,
        None => writeln!(w, "{} {} none", MAGIC, VERSION)?,
    }
    writeln!(w, "{}", graph.nodes().len())?;
    writeln!(w, "{}", graph.edges().len())?;

    for n in graph.nodes() {
        writeln!(
            w,
            "N {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {}",
            n.id.seg,
            n.id.lane,
            n.id.pt,
            n.index.0,
            n.ll.latitude,
            n.ll.longitude,
            n.map.x(),
            n.map.y(),
            n.lane_width.inner_meters(),
            flag(n.is_entry),
            flag(n.is_exit),
            flag(n.is_goal),
            flag(n.is_lane_change),
            flag(n.is_spot),
            flag(n.is_stop),
            flag(n.is_perimeter),
            n.checkpoint_id
        )?;
    }
    for e in graph.edges() {
        writeln!(
            w,
            "E {} {} {} {} {} {} {} {} {} {}",
            e.u.0,
            e.v.0,
            e.left_boundary,
            e.right_boundary,
            e.distance.inner_meters(),
            e.speed_min,
            e.speed_max,
            flag(e.is_exit),
            flag(e.is_implicit),
            flag(e.blocked)
        )?;
    }
    Ok(())
}

pub fn read_snapshot<R: BufRead>(r: R) -> Result<Graph> {
    let mut lines = r.lines();
    let mut next_line = |what: &str| -> Result<String> {
        match lines.next() {
            Some(line) => Ok(line?),
            None => bail!("snapshot ends before {}", what),
        }
    };

    let header = next_line("the header")?;
    let frame = parse_header(&header)?;
    let num_nodes: usize = parse(next_line("the node count")?.trim(), "node count")?;
    let num_edges: usize = parse(next_line("the edge count")?.trim(), "edge count")?;

    let mut nodes = Vec::with_capacity(num_nodes);
    for i in 0..num_nodes {
        let line = next_line("all nodes")?;
        nodes.push(parse_node(&line).with_context(|| format!("node line {}", i))?);
    }
    let mut edges = Vec::with_capacity(num_edges);
    for i in 0..num_edges {
        let line = next_line("all edges")?;
        edges.push(parse_edge(&line).with_context(|| format!("edge line {}", i))?);
    }

    let mut graph = Graph::new(nodes, edges)?;
    graph.frame = frame;
    Ok(graph)
}

fn flag(x: bool) -> u8 {
    if x {
        1
    } else {
        0
    }
}

fn parse<T: FromStr>(x: &str, what: &str) -> Result<T> {
    match x.parse::<T>() {
        Ok(v) => Ok(v),
        Err(_) => bail!("bad {}: {}", what, x),
    }
}

// Geometry types panic on NaN and infinity, so reject them while parsing.
fn parse_finite(x: &str, what: &str) -> Result<f64> {
    let v: f64 = parse(x, what)?;
    if !v.is_finite() {
        bail!("bad {}: {} isn't finite", what, x);
    }
    Ok(v)
}

fn parse_flag(x: &str) -> Result<bool> {
    match x {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => bail!("bad flag: {}", x),
    }
}

fn parse_header(line: &str) -> Result<Option<Frame>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 3 || fields[0] != MAGIC {
        bail!("not a graph snapshot: {}", line);
    }
    if fields[1] != VERSION {
        bail!("unsupported snapshot version {}", fields[1]);
    }
    match (fields[2], fields.len()) {
        ("none", 3) => Ok(None),
        ("planar", 3) => Ok(Some(Frame::Planar)),
        ("utm", 6) => Ok(Some(Frame::Utm {
            zone: parse(fields[3], "UTM zone")?,
            origin_easting: parse(fields[4], "easting")?,
            origin_northing: parse(fields[5], "northing")?,
        })),
        _ => bail!("bad frame in header: {}", line),
    }
}

fn parse_node(line: &str) -> Result<WayPointNode> {
    let f: Vec<&str> = line.split_whitespace().collect();
    if f.len() != 18 || f[0] != "N" {
        bail!("expected 18 node fields, got {}", line);
    }
    let id = ElementID::new(
        parse(f[1], "segment")?,
        parse(f[2], "lane")?,
        parse(f[3], "point")?,
    );
    let index = NodeIndex(parse(f[4], "index")?);
    let ll = LonLat::new(
        parse_finite(f[6], "longitude")?,
        parse_finite(f[5], "latitude")?,
    );
    let width = parse_finite(f[9], "lane width")?;
    let mut node = WayPointNode::new(id, index, ll, Distance::meters(width));
    node.map = Pt2D::new(parse_finite(f[7], "x")?, parse_finite(f[8], "y")?);
    node.is_entry = parse_flag(f[10])?;
    node.is_exit = parse_flag(f[11])?;
    node.is_goal = parse_flag(f[12])?;
    node.is_lane_change = parse_flag(f[13])?;
    node.is_spot = parse_flag(f[14])?;
    node.is_stop = parse_flag(f[15])?;
    node.is_perimeter = parse_flag(f[16])?;
    node.checkpoint_id = parse(f[17], "checkpoint")?;
    Ok(node)
}

fn parse_edge(line: &str) -> Result<WayPointEdge> {
    let f: Vec<&str> = line.split_whitespace().collect();
    if f.len() != 11 || f[0] != "E" {
        bail!("expected 11 edge fields, got {}", line);
    }
    let mut e = WayPointEdge::new(NodeIndex(parse(f[1], "u")?), NodeIndex(parse(f[2], "v")?));
    e.left_boundary = f[3].parse()?;
    e.right_boundary = f[4].parse()?;
    e.distance = Distance::meters(parse_finite(f[5], "distance")?);
    e.speed_min = parse(f[6], "min speed")?;
    e.speed_max = parse(f[7], "max speed")?;
    e.is_exit = parse_flag(f[8])?;
    e.is_implicit = parse_flag(f[9])?;
    e.blocked = parse_flag(f[10])?;
    Ok(e)
}
