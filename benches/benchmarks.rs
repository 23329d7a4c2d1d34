use std::io::BufReader;

use criterion::{criterion_group, criterion_main, Criterion};
use lhe_stream::{count_events, LheFile, ReadOptions, Reader, WeightStyle, Writer};

const NEVENTS: usize = 2000;

fn event_text() -> String {
    let mut txt = String::from(
        r#"<LesHouchesEvents version="3.0">
<header>
<MGVersion>3.5.0</MGVersion>
</header>
<init>
2212 2212 0.70000000E+04 0.70000000E+04 0 0 230000 230000 2 1
0.12058812E+09 0.70251748E+06 0.94290490E+05 1
<initrwgt>
<weightgroup type="scale_variation" combine="envelope">
"#,
    );
    for id in 1..=9 {
        txt += &format!("<weight id=\"{id}\"> muR={id} </weight>\n");
    }
    txt += "</weightgroup>\n</initrwgt>\n</init>\n";
    for n in 0..NEVENTS {
        let pz = 10. + n as f64;
        txt += &format!(
            "<event>
 4      1 8.4515120e+04 9.11880e+01 7.546771e-03 1.190024e-01
        1 -1    0    0  503    0 0.0 0.0 {pz:.8e} {pz:.8e} 0.0 0.0 1.0
       21 -1    0    0  501  502 0.0 0.0 -1.2403761329e+03 1.2403761329e+03 0.0 0.0 -1.0
       21  1    1    2  503  502 3.7283715118e+01 2.198166528e+01 -1.132689358e+03 1.1335159684e+03 0.0 0.0 -1.0
        1  1    1    2  501    0 -3.7283715118e+01 -2.198166528e+01 -1.0290783056e+02 1.1163910879e+02 0.0 0.0 1.0
<rwgt>
"
        );
        for id in 1..=9 {
            txt += &format!("<wgt id='{id}'> 0.{id}5E+05 </wgt>\n");
        }
        txt += "</rwgt>\n</event>\n";
    }
    txt += "</LesHouchesEvents>\n";
    txt
}

fn criterion_benchmark(c: &mut Criterion) {
    let event_txt = event_text();

    c.bench_function("read", |b| {
        b.iter(|| {
            let reader = BufReader::new(event_txt.as_bytes());
            let lhef = Reader::new(reader).unwrap();
            let nevents = lhef.map(Result::unwrap).count();
            assert_eq!(nevents, NEVENTS);
        })
    });

    c.bench_function("read plain", |b| {
        b.iter(|| {
            let reader = BufReader::new(event_txt.as_bytes());
            let lhef = Reader::with_options(reader, ReadOptions::plain()).unwrap();
            let nevents = lhef.map(Result::unwrap).count();
            assert_eq!(nevents, NEVENTS);
        })
    });

    c.bench_function("count", |b| {
        b.iter(|| assert_eq!(count_events(event_txt.as_bytes()), NEVENTS as i64))
    });

    let file = LheFile::read(event_txt.as_bytes()).unwrap();
    c.bench_function("write", |b| {
        b.iter(|| {
            let mut writer = Writer::new(std::io::sink(), &file.init.version).unwrap();
            if let Some(header) = &file.header {
                writer.header(header).unwrap();
            }
            writer.init(&file.init).unwrap();
            for event in &file.events {
                writer.event(event).unwrap();
            }
            writer.finish().unwrap();
        })
    });

    c.bench_function("write weights", |b| {
        b.iter(|| file.write(std::io::sink(), WeightStyle::Weights).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
