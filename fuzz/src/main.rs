#[macro_use]
extern crate afl;

use webpbits::{BooleanDecoder, LsbBitReader, Vp8Partitions, Vp8lHeader};

fn main() {
  fuzz!(|data: &[u8]| {
    // Remove the panic hook so we can actually catch panic
    std::panic::set_hook(Box::new(|_| {}));

    if data.len() < 3 {
      return;
    }
    // First three bytes steer partition layout, like a VP8 frame tag
    let partition_length = usize::from(data[0]) | usize::from(data[1]) << 8;
    let payload = &data[3..];

    let mut first = BooleanDecoder::new(payload, partition_length, usize::from(data[2] & 0x0f));
    for _ in 0..256 {
      first.get_bit(data[2]);
    }
    if let Ok(mut parts) = Vp8Partitions::parse(&mut first) {
      for row in 0..8 {
        parts.for_row(row).read_signed_value(7);
      }
    }

    let mut reader = LsbBitReader::new(payload);
    let _ = Vp8lHeader::read(&mut reader);
    while !reader.eos() {
      reader.fill_bit_window();
      let bits = reader.prefetch_bits();
      reader.advance_bit_position((bits & 0x0f) as u32 + 1);
      reader.read_value((bits >> 4) as u32 & 0x1f);
    }
  });
}
