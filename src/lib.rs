//! Streaming reader and writer for Les Houches Event (LHE) files
//!
//! Events are read one at a time, so memory use is bounded by the size of a
//! single event, not the size of the file.
//!
//! # Example
//!
//! ```rust,no_run
//! use lhe_stream::{transport, LheFile, WeightStyle};
//!
//! // plain or gzip-compressed input
//! let reader = transport::read_lhe_with_attributes("events.lhe.gz").unwrap();
//! let init = reader.init().clone();
//! let mut events = Vec::new();
//! for event in reader {
//!     let event = event.unwrap();
//!     for particle in event.final_state() {
//!         println!("{} from {:?}", particle.id, particle.mothers());
//!     }
//!     events.push(event);
//! }
//! let file = LheFile::new(init, events);
//! transport::write_lhe_file_path(&file, "copy.lhe", false, WeightStyle::Rwgt).unwrap();
//! ```
pub mod data;
pub mod error;
mod numbers;
pub mod reader;
mod records;
pub mod status;
mod tags;
mod tokenizer;
pub mod transport;
pub mod weights;
pub mod writer;

pub use data::*;
pub use error::*;
pub use reader::*;
pub use status::Status;
pub use weights::WeightIndex;
pub use writer::*;

/// Generic XML element, used for the `<header>` block
pub type XmlTree = xmltree::Element;

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io::{self, BufReader, Read};
    use std::rc::Rc;

    use super::*;

    const EVENT: &str = "<event>
 4      1 8.4515120e+04 9.11880e+01 7.546771e-03 1.190024e-01
        1 -1    0    0  503    0 0.00000000e+00 0.00000000e+00 4.77894434e+00 4.77894434e+00 0.00000000e+00 0.0000e+00 1.0000e+00
       21 -1    0    0  501  502 0.00000000e+00 0.00000000e+00 -1.24037613e+03 1.24037613e+03 0.00000000e+00 0.0000e+00 -1.0000e+00
       21  1    1    2  503  502 3.72837151e+01 2.19816653e+01 -1.13268936e+03 1.13351597e+03 0.00000000e+00 0.0000e+00 -1.0000e+00
        1  1    1    2  501    0 -3.72837151e+01 -2.19816653e+01 -1.02907831e+02 1.11639109e+02 0.00000000e+00 0.0000e+00 1.0000e+00
<mgrwt>
<rscale>  2 0.91188000E+02</rscale>
</mgrwt>
<weights>
0.84515E+05 0.80121E+05 0.88765E+05 0.90144E+05 0.85412E+05 0.94779E+05 0.79011E+05 0.74923E+05 0.83054E+05
</weights>
</event>
";

    fn document(n_events: usize) -> String {
        let mut doc = String::from(
            r#"<LesHouchesEvents version="3.0">
<header>
<MGVersion>3.5.0</MGVersion>
<MG5ProcCard>generate p p > j j</MG5ProcCard>
</header>
<init>
2212 2212 0.70000000E+04 0.70000000E+04 0 0 230000 230000 2 1
0.12058812E+09 0.70251748E+06 0.94290490E+05 1
<initrwgt>
<weightgroup type="scale_variation" combine="envelope">
"#,
        );
        for id in 1001..1010 {
            doc += &format!("<weight id=\"{id}\"> dyn_scale_choice={id} </weight>\n");
        }
        doc += "</weightgroup>\n</initrwgt>\n</init>\n";
        for _ in 0..n_events {
            doc += EVENT;
        }
        doc += "</LesHouchesEvents>\n";
        doc
    }

    #[test]
    fn init_scenario() {
        let doc = document(0).replace(
            "2212 2212 0.70000000E+04 0.70000000E+04 0 0 230000 230000 2 1",
            "2212 2212 4000.0 4000.0 -1 -1 21100 21100 -4 1",
        );
        let reader = Reader::new(doc.as_bytes()).unwrap();
        let info = reader.init().info;
        assert_eq!((info.beam_a, info.beam_b), (2212, 2212));
        assert_eq!((info.energy_a, info.energy_b), (4000., 4000.));
        assert_eq!((info.pdf_group_a, info.pdf_group_b), (-1, -1));
        assert_eq!((info.pdf_set_a, info.pdf_set_b), (21100, 21100));
        assert_eq!(info.weighting_strategy, -4);
        assert_eq!(info.num_processes, 1);
    }

    #[test]
    fn weight_reconciliation() {
        let doc = document(2);
        let mut reader = Reader::new(doc.as_bytes()).unwrap();
        let ids: Vec<_> = reader.init().weight_groups["scale_variation"]
            .weights
            .keys()
            .cloned()
            .collect();
        let expected: Vec<_> = (1001..1010).map(|id| id.to_string()).collect();
        assert_eq!(ids, expected);

        let ev = reader.next().unwrap().unwrap();
        let weights: Vec<_> = ev.weights().keys().cloned().collect();
        assert_eq!(weights, expected);
        assert_eq!(ev.weights()["1001"], 84515.);
        assert_eq!(ev.weights()["1009"], 83054.);
        let descriptor = reader.init().weight("1005").unwrap();
        assert_eq!(descriptor.index, 4);
        assert_eq!(descriptor.name, "dyn_scale_choice=1005");
    }

    #[test]
    fn mothers_of_outgoing_gluon() {
        let doc = document(1);
        let ev = LheFile::read(doc.as_bytes()).unwrap().events.remove(0);
        let gluon = ev.particle(2).unwrap();
        let mothers: Vec<_> = gluon.mothers().iter().map(|m| m.id).collect();
        assert_eq!(mothers, [1, 21]);
        assert!(ev.particle(0).unwrap().mothers().is_empty());
        assert_eq!(ev.final_state().count(), 2);
        assert_eq!(gluon.status_kind(), Status::Outgoing);
    }

    #[test]
    fn round_trip() {
        let doc = document(3);
        let file = LheFile::read(doc.as_bytes()).unwrap();
        for style in [WeightStyle::Rwgt, WeightStyle::Weights] {
            let output = file.to_lhe_string(style).unwrap();
            let reread = LheFile::read(output.as_bytes()).unwrap();
            assert_eq!(reread, file);
        }
        let output = file.to_lhe_string(WeightStyle::None).unwrap();
        let reread = LheFile::read(output.as_bytes()).unwrap();
        assert_eq!(reread.init, file.init);
        assert!(reread.events.iter().all(|ev| ev.weights().is_empty()));
    }

    #[test]
    fn constructed_file_round_trip() {
        let mut group = WeightGroup {
            attributes: XmlAttr::from([("type".to_owned(), "scale_variation".to_owned())]),
            weights: Default::default(),
        };
        for (index, id) in ["1", "2"].into_iter().enumerate() {
            let weight = WeightInfo {
                attributes: XmlAttr::from([("id".to_owned(), id.to_owned())]),
                name: format!("muR={id}"),
                index,
            };
            group.weights.insert(id.to_owned(), weight);
        }
        let init = Init {
            info: InitInfo {
                beam_a: 2212,
                beam_b: -2212,
                energy_a: 980.,
                energy_b: 980.,
                pdf_group_a: 0,
                pdf_group_b: 0,
                pdf_set_a: 10042,
                pdf_set_b: 10042,
                weighting_strategy: 3,
                num_processes: 1,
            },
            processes: vec![ProcInfo {
                x_section: 12.5,
                error: 0.25,
                unit_weight: 1.,
                proc_id: 81,
            }],
            weight_groups: [("scale_variation".to_owned(), group)].into_iter().collect(),
            version: "3.0".to_owned(),
        };
        let info = EventInfo {
            nparticles: 3,
            pid: 81,
            weight: 1.,
            scale: 91.188,
            aqed: 0.0078125,
            aqcd: 0.125,
        };
        let particle = |id, status, mother1, mother2, pz: f64, e: f64| Particle {
            id,
            status,
            mother1,
            mother2,
            color1: 0,
            color2: 0,
            px: 0.,
            py: 0.,
            pz,
            e,
            m: 0.,
            lifetime: 0.,
            spin: 9.,
        };
        let particles = vec![
            particle(2, -1, 0, 0, 45.5, 45.5),
            particle(-2, -1, 0, 0, -45.5, 45.5),
            particle(23, 2, 1, 2, 0., 91.),
        ];
        let weights = Weights::from([("1".to_owned(), 0.5), ("2".to_owned(), 1.25)]);
        let events = vec![
            Event::new(info, particles.clone()),
            Event::new(info, particles)
                .with_weights(weights)
                .with_comments(vec!["#generated".to_owned()]),
        ];
        let file = LheFile::new(init, events);

        let output = file.to_lhe_string(WeightStyle::Rwgt).unwrap();
        let reread = LheFile::read(output.as_bytes()).unwrap();
        assert_eq!(reread, file);
        let z = reread.events[1].particle(2).unwrap();
        assert_eq!(z.mothers().len(), 2);
        assert_eq!(reread.init.weight("2").unwrap().index, 1);
    }

    #[test]
    fn header_survives_round_trip() {
        let doc = document(1);
        let file = LheFile::read(doc.as_bytes()).unwrap();
        let header = file.header.as_ref().unwrap();
        assert_eq!(header.children.len(), 2);
        let output = file.to_lhe_string(WeightStyle::Rwgt).unwrap();
        assert!(output.starts_with("<LesHouchesEvents version=\"3.0\">\n<header>"));
        let reread = LheFile::read(output.as_bytes()).unwrap();
        assert_eq!(reread.header.as_ref(), Some(header));
    }

    #[test]
    fn momentum_precision() {
        let doc = document(1).replacen("3.72837151e+01", "-0.31463804033", 1);
        let file = LheFile::read(doc.as_bytes()).unwrap();
        let px = file.events[0].particles()[2].px;
        assert_eq!(px, -0.31463804033);
        let output = file.to_lhe_string(WeightStyle::Rwgt).unwrap();
        let reread = LheFile::read(output.as_bytes()).unwrap();
        let reread_px = reread.events[0].particles()[2].px;
        assert!((reread_px - px).abs() <= 1e-8 * px.abs());
    }

    /// Counts the bytes pulled from the underlying source
    struct Counting<R> {
        inner: R,
        pulled: Rc<Cell<usize>>,
    }

    impl<R: Read> Read for Counting<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.inner.read(buf)?;
            self.pulled.set(self.pulled.get() + n);
            Ok(n)
        }
    }

    #[test]
    fn streaming_memory_bound() {
        let doc = document(500);
        let pulled = Rc::new(Cell::new(0));
        let source = Counting {
            inner: doc.as_bytes(),
            pulled: pulled.clone(),
        };
        let reader = Reader::new(BufReader::with_capacity(1024, source)).unwrap();
        let events: Vec<_> = reader.take(2).map(Result::unwrap).collect();
        assert_eq!(events.len(), 2);
        let init_size = doc.find("<event>").unwrap();
        assert!(pulled.get() <= init_size + 3 * EVENT.len() + 1024);
        assert!(pulled.get() * 20 < doc.len());
    }

    #[test]
    fn missing_init_is_fatal() {
        let doc = format!("<LesHouchesEvents version=\"3.0\">\n{EVENT}</LesHouchesEvents>\n");
        let err = Reader::new(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, ReadError::Structure(StructureError::MissingInit)));
        let stream = BufReader::new(io::Cursor::new(doc));
        assert!(LheFile::read(stream).is_err());
    }

    #[test]
    fn truncated_stream() {
        let _ = env_logger::builder().is_test(true).try_init();
        let doc = document(4);
        let truncated = &doc[..doc.rfind("<mgrwt>").unwrap()];
        let mut reader = Reader::new(truncated.as_bytes()).unwrap();
        let events: Vec<_> = reader.by_ref().map(Result::unwrap).collect();
        assert_eq!(events.len(), 3);
        assert!(reader.transport_error().is_some());
        assert_eq!(count_events(truncated.as_bytes()), -1);
        assert_eq!(count_events(doc.as_bytes()), 4);
    }
}
