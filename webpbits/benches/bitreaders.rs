use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use webpbits::{BooleanDecoder, LsbBitReader};

fn generate_data(len: usize) -> Vec<u8> {
  let mut seed = 0x2545_f491_u32;
  (0..len)
    .map(|_| {
      seed ^= seed << 13;
      seed ^= seed >> 17;
      seed ^= seed << 5;
      seed as u8
    })
    .collect()
}

fn decode_bool(data: &[u8]) -> u32 {
  let mut dec = BooleanDecoder::new(data, data.len(), 0);
  let mut acc = 0;
  while !dec.is_eof() {
    acc += dec.get_bit(black_box(180));
  }
  acc
}

fn decode_lsb(data: &[u8]) -> u32 {
  let mut reader = LsbBitReader::new(data);
  let mut acc = 0_u32;
  while !reader.eos() {
    reader.fill_bit_window();
    let bits = reader.prefetch_bits() as u32 & 0x7ff;
    reader.advance_bit_position(5);
    acc = acc.wrapping_add(bits ^ reader.read_value(7));
  }
  acc
}

fn criterion_benchmark(c: &mut Criterion) {
  let mut group = c.benchmark_group("bitreaders");
  // Configure Criterion.rs to detect smaller differences and increase sample size to improve
  // precision and counteract the resulting noise.
  group.significance_level(0.1).sample_size(20);

  let data = generate_data(1 << 20);

  group.bench_with_input("vp8_get_bit_1mb", &data, |b, data| b.iter(|| decode_bool(black_box(data))));
  group.bench_with_input("vp8l_read_value_1mb", &data, |b, data| b.iter(|| decode_lsb(black_box(data))));

  group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
