use criterion::*;

use yadfa::ir::{parse_program, Scanner};

fn countdown_source(copies: usize) -> String {
    let mut source = String::from("var n int32\nmov n 100\n");
    for index in 0..copies {
        source.push_str(&format!(
            "label l{index} :\nsub n n 1\ncmp_gt t n 0\nif t l{index}\n"
        ));
    }
    source.push_str("push n\n");
    source
}

fn scan_to_end(input: &str) {
    let mut scanner = Scanner::new(input);
    loop {
        if scanner.next_token().is_empty() {
            break;
        }
    }
}

fn frontend_throughput(c: &mut Criterion) {
    let small = ("Small Countdown Input", countdown_source(8));
    let medium = ("Medium Countdown Input", countdown_source(64));
    let large = ("Large Countdown Input", countdown_source(512));

    let mut group = c.benchmark_group("Scanner Throughput");
    for (name, input) in [&small, &medium, &large] {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(format!(" {}", name), input, |b, input| {
            b.iter(|| scan_to_end(input))
        });
    }
    group.finish();

    let mut group = c.benchmark_group("Parser Throughput");
    for (name, input) in [&small, &medium, &large] {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(format!(" {}", name), input, |b, input| {
            b.iter(|| parse_program(input).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, frontend_throughput);
criterion_main!(benches);
