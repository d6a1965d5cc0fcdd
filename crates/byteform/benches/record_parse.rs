use byteform::field::Field;
use byteform::numeric::{Format, ScalarField};
use byteform::record::{Member, Record};
use byteform::value::ByteOrder;
use criterion::{criterion_group, criterion_main, Criterion};

fn gen_record(field_count: usize) -> Record {
    let mut members = Vec::with_capacity(field_count);

    for i in 0..field_count {
        members.push(Member::new(
            format!("f{}", i),
            Field::Scalar(ScalarField {
                byte_order: Some(ByteOrder::Big),
                ..ScalarField::new(Format::UShort)
            }),
        ));
    }

    Record::new("bench", members).unwrap()
}

fn gen_packet(total_bytes: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(total_bytes);

    // Deterministic but non-trivial pattern
    for i in 0..total_bytes {
        data.push((i * 31 % 256) as u8);
    }

    data
}

fn bench_record_parse(c: &mut Criterion) {
    for &field_count in &[1usize, 10, 50, 100] {
        let record = gen_record(field_count);
        let packet = gen_packet(field_count * 2);

        c.bench_function(&format!("parse_{}_fields", field_count), |b| {
            b.iter(|| {
                let _ = record.parse(&packet).unwrap();
            })
        });
    }
}

criterion_group!(benches, bench_record_parse);
criterion_main!(benches);
