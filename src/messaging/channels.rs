// Communication channels lock-free

use crate::messaging::command::SynthCommand;
use ringbuf::{HeapRb, traits::Split};

pub type CommandProducer = ringbuf::HeapProd<SynthCommand>;
pub type CommandConsumer = ringbuf::HeapCons<SynthCommand>;

pub fn create_command_channel(capacity: usize) -> (CommandProducer, CommandConsumer) {
    let rb = HeapRb::<SynthCommand>::new(capacity);
    rb.split()
}
