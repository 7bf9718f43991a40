use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::model::space::GraspId;
use crate::model::unit::Cost;

use super::{NodeId, RoadmapError};

/// Optional line-oriented trace of roadmap activity, split across two
/// comma-separated sinks: a roadmap file with one record per node creation
/// (`uid, D, x1, .., xD`) and an event log of validity checks and edge-cost
/// resolutions (`VAL_BASE`/`VAL_GRASP`/`EDGE_COST`/`EDGE_COST_GRASP`).
///
/// Write failures are logged and swallowed; tracing must never abort a
/// planning query.
pub struct TraceSink {
    roadmap: csv::Writer<Box<dyn Write>>,
    events: csv::Writer<Box<dyn Write>>,
}

impl TraceSink {
    pub fn from_writers<R, E>(roadmap: R, events: E) -> TraceSink
    where
        R: Write + 'static,
        E: Write + 'static,
    {
        TraceSink {
            roadmap: csv::WriterBuilder::new()
                .flexible(true)
                .has_headers(false)
                .from_writer(Box::new(roadmap) as Box<dyn Write>),
            events: csv::WriterBuilder::new()
                .flexible(true)
                .has_headers(false)
                .from_writer(Box::new(events) as Box<dyn Write>),
        }
    }

    pub fn from_paths<P: AsRef<Path>>(roadmap_path: P, event_path: P) -> Result<TraceSink, RoadmapError> {
        let roadmap = File::create(roadmap_path.as_ref())
            .map_err(|e| RoadmapError::TraceFailure(format!("{}", e)))?;
        let events = File::create(event_path.as_ref())
            .map_err(|e| RoadmapError::TraceFailure(format!("{}", e)))?;
        Ok(TraceSink::from_writers(roadmap, events))
    }

    pub fn flush(&mut self) {
        let _ = self.roadmap.flush();
        let _ = self.events.flush();
    }

    pub(super) fn node_created(&mut self, uid: NodeId, config: &[f64]) {
        let mut record = vec![uid.to_string(), config.len().to_string()];
        record.extend(config.iter().map(|x| x.to_string()));
        self.write_roadmap(&record);
    }

    pub(super) fn base_validity(&mut self, uid: NodeId, valid: bool) {
        self.write_event(&[
            "VAL_BASE".to_string(),
            uid.to_string(),
            (valid as u8).to_string(),
        ]);
    }

    pub(super) fn grasp_validity(&mut self, uid: NodeId, gid: GraspId, valid: bool) {
        self.write_event(&[
            "VAL_GRASP".to_string(),
            uid.to_string(),
            gid.to_string(),
            (valid as u8).to_string(),
        ]);
    }

    pub(super) fn base_cost(&mut self, a: NodeId, b: NodeId, cost: Cost) {
        self.write_event(&[
            "EDGE_COST".to_string(),
            a.to_string(),
            b.to_string(),
            cost.to_string(),
        ]);
    }

    pub(super) fn grasp_cost(&mut self, a: NodeId, b: NodeId, gid: GraspId, cost: Cost) {
        self.write_event(&[
            "EDGE_COST_GRASP".to_string(),
            a.to_string(),
            b.to_string(),
            gid.to_string(),
            cost.to_string(),
        ]);
    }

    fn write_roadmap(&mut self, record: &[String]) {
        if let Err(e) = self.roadmap.write_record(record) {
            log::warn!("failed to write roadmap trace record: {}", e);
        }
    }

    fn write_event(&mut self, record: &[String]) {
        if let Err(e) = self.events.write_record(record) {
            log::warn!("failed to write event trace record: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_trace_record_format() {
        let dir = tempfile::tempdir().unwrap();
        let roadmap_path = dir.path().join("roadmap.csv");
        let event_path = dir.path().join("events.csv");
        {
            let mut sink = TraceSink::from_paths(&roadmap_path, &event_path).unwrap();
            sink.node_created(NodeId(3), &[0.25, 0.5]);
            sink.base_validity(NodeId(3), true);
            sink.grasp_validity(NodeId(3), GraspId(1), false);
            sink.base_cost(NodeId(3), NodeId(4), Cost::new(0.75));
            sink.grasp_cost(NodeId(3), NodeId(4), GraspId(1), Cost::INFINITY);
            sink.flush();
        }
        let roadmap = fs::read_to_string(&roadmap_path).unwrap();
        assert_eq!(roadmap, "3,2,0.25,0.5\n");
        let events = fs::read_to_string(&event_path).unwrap();
        let lines: Vec<&str> = events.lines().collect();
        assert_eq!(
            lines,
            vec![
                "VAL_BASE,3,1",
                "VAL_GRASP,3,1,0",
                "EDGE_COST,3,4,0.75",
                "EDGE_COST_GRASP,3,4,1,inf",
            ]
        );
    }
}
