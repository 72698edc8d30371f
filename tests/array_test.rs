/*!
 * Remote Array Tests
 * Element access, initialization and release against the loopback device
 */

use mcu_remote::gateway::{ops, LoopbackDevice, SerializedGateway};
use mcu_remote::{
    DeviceSession, ElementWidth, HostConfig, InitialValues, RemoteCall, RemoteError, ReturnKind,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;

fn loopback_session() -> (LoopbackDevice, DeviceSession) {
    let device = LoopbackDevice::new(&HostConfig::default());
    let session = DeviceSession::new(Arc::new(SerializedGateway::new(device.clone())));
    (device, session)
}

#[test]
fn test_values_shorter_than_length() {
    let (_device, session) = loopback_session();
    let array = session
        .array(4, ElementWidth::Byte, vec![10, 20, 30])
        .unwrap();

    assert_eq!(array.get(0).unwrap(), 10);
    assert_eq!(array.get(1).unwrap(), 20);
    assert_eq!(array.get(2).unwrap(), 30);
    // Never written: any value, but the read itself succeeds
    assert!(array.get(3).is_ok());
    assert_eq!(
        array.get(4),
        Err(RemoteError::IndexOutOfRange { index: 4, length: 4 })
    );
}

#[test]
fn test_text_initialization_uses_ordinals() {
    let (_device, session) = loopback_session();
    let array = session.array(3, ElementWidth::HalfWord, "AB").unwrap();

    assert_eq!(array.get(0).unwrap(), 65);
    assert_eq!(array.get(1).unwrap(), 66);
}

#[test]
fn test_broadcast_initialization() {
    let (_device, session) = loopback_session();
    let array = session.array(6, ElementWidth::Word, 0x1234_5678).unwrap();

    assert_eq!(array.to_vec().unwrap(), vec![0x1234_5678; 6]);
}

#[test]
fn test_longer_sequence_is_truncated() {
    let (device, session) = loopback_session();
    let array = session
        .array(2, ElementWidth::Byte, [1, 2, 3, 4, 5])
        .unwrap();

    assert_eq!(array.to_vec().unwrap(), vec![1, 2]);
    // Two init writes plus two reads
    assert_eq!(device.count_calls(ops::DEREF), 4);
}

#[test]
fn test_one_write_per_initialized_element() {
    let (device, session) = loopback_session();
    let _array = session.array(5, ElementWidth::Byte, 9).unwrap();
    assert_eq!(device.count_calls(ops::MALLOC), 1);
    assert_eq!(device.count_calls(ops::DEREF), 5);

    let _uninit = session
        .array(5, ElementWidth::Byte, InitialValues::Uninitialized)
        .unwrap();
    assert_eq!(device.count_calls(ops::DEREF), 5);
}

#[test]
fn test_element_addresses_scale_with_width() {
    let (device, session) = loopback_session();
    let array = session
        .array(3, ElementWidth::Word, InitialValues::Uninitialized)
        .unwrap();
    array.set(2, 7).unwrap();

    let journal = device.journal();
    let write = journal.last().unwrap();
    assert_eq!(write.operation, ops::DEREF);
    assert_eq!(
        write.args,
        vec![i64::from(array.base_address()) + 8, 4, 7]
    );
}

#[test]
fn test_set_masks_to_element_width() {
    let (_device, session) = loopback_session();
    let array = session.array(2, ElementWidth::Byte, 0).unwrap();

    array.set(0, 300).unwrap();
    array.set(1, -1).unwrap();
    assert_eq!(array.get(0).unwrap(), 300 & 0xFF);
    assert_eq!(array.get(1).unwrap(), 0xFF);
}

#[test]
fn test_neighbouring_elements_are_independent() {
    let (_device, session) = loopback_session();
    let array = session.array(4, ElementWidth::HalfWord, 0).unwrap();

    array.set(1, 0xBEEF).unwrap();
    assert_eq!(array.to_vec().unwrap(), vec![0, 0xBEEF, 0, 0]);
}

#[test]
fn test_invalid_value_type_is_local() {
    let (device, session) = loopback_session();
    let array = session
        .array(2, ElementWidth::Byte, InitialValues::Uninitialized)
        .unwrap();
    let before = device.journal().len();

    assert!(matches!(
        array.set(0, 1.5),
        Err(RemoteError::InvalidValueType { ref kind }) if kind == "float"
    ));
    assert!(matches!(
        array.set(0, "x"),
        Err(RemoteError::InvalidValueType { .. })
    ));
    assert!(matches!(
        array.set(0, true),
        Err(RemoteError::InvalidValueType { .. })
    ));
    assert_eq!(device.journal().len(), before);
}

#[test]
fn test_zero_length_rejected() {
    let (device, session) = loopback_session();
    assert_eq!(
        session.array(0, ElementWidth::Byte, 1).unwrap_err(),
        RemoteError::InvalidLength(0)
    );
    assert!(device.journal().is_empty());
}

#[test]
fn test_unsupported_width_rejected() {
    let (_device, session) = loopback_session();
    let err = mcu_remote::RemoteArray::with_width_bytes(
        session.gateway().clone(),
        session.heap().clone(),
        4,
        3,
        InitialValues::Uninitialized,
    )
    .unwrap_err();
    assert_eq!(err, RemoteError::UnsupportedWidth(3));
}

#[test]
fn test_drop_releases_exactly_once() {
    let (device, session) = loopback_session();
    {
        let array = session.array(8, ElementWidth::Word, 1).unwrap();
        assert_eq!(device.live_blocks(), 1);
        assert_eq!(array.len(), 8);
    }
    assert_eq!(device.count_calls(ops::FREE), 1);
    assert_eq!(device.live_blocks(), 0);
    assert_eq!(device.heap_used_bytes(), 0);
}

#[test]
fn test_drop_after_failed_access_still_releases() {
    let (device, session) = loopback_session();
    let array = session.array(4, ElementWidth::Byte, 0).unwrap();

    device.fail_next_calls(1);
    assert!(matches!(array.get(0), Err(RemoteError::Transport(_))));
    drop(array);

    assert_eq!(device.count_calls(ops::FREE), 1);
    assert_eq!(device.live_blocks(), 0);
}

#[test]
fn test_failed_release_is_not_propagated() {
    let (device, session) = loopback_session();
    let array = session.array(4, ElementWidth::Byte, 0).unwrap();

    device.fail_next_calls(1);
    // The free never reaches the device; dropping must still not panic
    drop(array);
    assert_eq!(device.count_calls(ops::FREE), 0);
    assert_eq!(device.live_blocks(), 1);
}

#[test]
fn test_out_of_device_memory() {
    let device = LoopbackDevice::new(&HostConfig {
        loopback_ram_size: 64,
        ..HostConfig::default()
    });
    let session = DeviceSession::new(Arc::new(SerializedGateway::new(device.clone())));

    let _held = session.array(12, ElementWidth::Word, 0).unwrap();
    let err = session.array(8, ElementWidth::Word, 0).unwrap_err();
    assert_eq!(err, RemoteError::OutOfDeviceMemory { requested: 32 });
    assert_eq!(device.live_blocks(), 1);
}

#[test]
fn test_release_fault_is_swallowed() {
    let (device, session) = loopback_session();
    let array = session.array(2, ElementWidth::Byte, 0).unwrap();

    // Free the block behind the array's back, then free it again on drop
    session
        .gateway()
        .call(ops::FREE, ReturnKind::Void, &[i64::from(array.base_address())])
        .unwrap();
    assert_eq!(device.live_blocks(), 0);
    drop(array);
    // Second free faulted on the device and was swallowed
    assert_eq!(device.count_calls(ops::FREE), 2);
}

#[test]
fn test_arrays_do_not_overlap() {
    let (_device, session) = loopback_session();
    let a = session.array(3, ElementWidth::Byte, 0xAA).unwrap();
    let b = session.array(3, ElementWidth::Byte, 0x55).unwrap();

    assert_ne!(a.base_address(), b.base_address());
    assert_eq!(a.to_vec().unwrap(), vec![0xAA; 3]);
    assert_eq!(b.to_vec().unwrap(), vec![0x55; 3]);
}

proptest! {
    #[test]
    fn prop_set_then_get_masks_to_width(
        width in prop_oneof![Just(1usize), Just(2usize), Just(4usize)],
        index in 0usize..8,
        value in any::<i64>(),
    ) {
        let (_device, session) = loopback_session();
        let width = ElementWidth::from_bytes(width).unwrap();
        let array = session.array(8, width, InitialValues::Uninitialized).unwrap();

        array.set(index, value).unwrap();
        prop_assert_eq!(array.get(index).unwrap(), width.truncate(value));
    }

    #[test]
    fn prop_out_of_range_index_rejected(length in 1usize..16, offset in 0usize..1000) {
        let (device, session) = loopback_session();
        let array = session.array(length, ElementWidth::HalfWord, InitialValues::Uninitialized).unwrap();
        let calls_before = device.journal().len();

        let index = length + offset;
        prop_assert_eq!(
            array.get(index),
            Err(RemoteError::IndexOutOfRange { index, length })
        );
        prop_assert_eq!(
            array.set(index, 1),
            Err(RemoteError::IndexOutOfRange { index, length })
        );
        prop_assert_eq!(device.journal().len(), calls_before);
    }
}

#[test]
fn test_set_accepts_unsigned_indices_and_rejects_wide_values() {
    let (device, session) = loopback_session();
    let array = session
        .array(4, ElementWidth::Word, InitialValues::Uninitialized)
        .unwrap();

    for i in 0..array.len() {
        array.set(i, i * 3).unwrap();
    }
    assert_eq!(array.to_vec().unwrap(), vec![0, 3, 6, 9]);

    let before = device.journal().len();
    assert!(matches!(
        array.set(0, u64::MAX),
        Err(RemoteError::InvalidValueType { .. })
    ));
    assert_eq!(device.journal().len(), before);
}
