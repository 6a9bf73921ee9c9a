// VecMux - MSP430 Interrupt Dispatch Layer
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! F5510 hardware binding.
//!
//! Each enabled physical vector gets a permanent entry in the device vector
//! table. The entry points at a small assembly veneer that saves the
//! caller-saved registers, passes the address of the stacked status register
//! to a Rust entry function, and finishes with `reti`. Handing the stacked
//! SR address through [`HwRegs`] is what makes the deferred status-register
//! protocol work on real hardware: `sr_modify` rewrites the word `reti`
//! will restore.
//!
//! On interrupt entry the hardware pushes PC then SR, so the veneer's
//! incoming stack pointer addresses the stacked SR. The veneer then pushes
//! five words (r11..r15), which puts the SR ten bytes above the pointer it
//! hands to the entry function.

use core::ptr::{read_volatile, write_volatile};

use crate::exit::SrBits;
use crate::regs::{IntPort, Regs, TimerId};

const P1IE: *mut u8 = 0x021A as *mut u8;
const P1IFG: *mut u8 = 0x021C as *mut u8;
const P2IE: *mut u8 = 0x021B as *mut u8;
const P2IFG: *mut u8 = 0x021D as *mut u8;

const TA0IV: *mut u16 = 0x036E as *mut u16;
const TA1IV: *mut u16 = 0x03AE as *mut u16;
const TA2IV: *mut u16 = 0x042E as *mut u16;
const TB0IV: *mut u16 = 0x03EE as *mut u16;

/// Live register access for one interrupt activation.
struct HwRegs {
    /// Address of the status-register word the closing `reti` restores.
    sr_slot: *mut u16,
}

impl Regs for HwRegs {
    fn port_flags(&mut self, port: IntPort) -> u8 {
        let (ifg, ie) = match port {
            IntPort::P1 => (P1IFG, P1IE),
            IntPort::P2 => (P2IFG, P2IE),
        };
        unsafe { read_volatile(ifg) & read_volatile(ie) }
    }

    fn port_ack(&mut self, port: IntPort, bit: u8) {
        let ifg = match port {
            IntPort::P1 => P1IFG,
            IntPort::P2 => P2IFG,
        };
        unsafe { write_volatile(ifg, read_volatile(ifg) & !(1 << bit)) }
    }

    fn timer_iv(&mut self, timer: TimerId) -> u16 {
        let iv = match timer {
            TimerId::Ta0 => TA0IV,
            TimerId::Ta1 => TA1IV,
            TimerId::Ta2 => TA2IV,
            TimerId::Tb0 => TB0IV,
        };
        // The read itself clears the reported flag.
        unsafe { read_volatile(iv) }
    }

    fn sr_modify(&mut self, clear: SrBits, set: SrBits) {
        unsafe {
            let sr = read_volatile(self.sr_slot);
            write_volatile(self.sr_slot, (sr & !clear.bits()) | set.bits());
        }
    }
}

/// Emits the veneer, the Rust entry function, and the vector-table entry
/// for one physical vector.
macro_rules! bind_vector {
    ($section:literal, $veneer:ident, $entry:ident, $tramp:ident) => {
        core::arch::global_asm!(concat!(
            "    .text\n",
            "    .global ", stringify!($veneer), "\n",
            stringify!($veneer), ":\n",
            "    push r11\n",
            "    push r12\n",
            "    push r13\n",
            "    push r14\n",
            "    push r15\n",
            "    mov r1, r12\n",
            "    add #10, r12\n",
            "    call #", stringify!($entry), "\n",
            "    pop r15\n",
            "    pop r14\n",
            "    pop r13\n",
            "    pop r12\n",
            "    pop r11\n",
            "    reti\n",
        ));

        extern "C" {
            fn $veneer();
        }

        #[no_mangle]
        extern "C" fn $entry(sr_slot: *mut u16) {
            let mut hw = HwRegs { sr_slot };
            crate::trampolines::$tramp(&crate::DISPATCH, &mut hw);
        }

        const _: () = {
            #[used]
            #[link_section = $section]
            static ENTRY: unsafe extern "C" fn() = $veneer;
        };
    };
}

#[cfg(not(feature = "disable-rtc-vector"))]
bind_vector!("__interrupt_vector_41", vecmux_rtc, vecmux_rtc_entry, rtc);
#[cfg(not(feature = "disable-port2-vector"))]
bind_vector!("__interrupt_vector_42", vecmux_port2, vecmux_port2_entry, port2);
#[cfg(not(feature = "disable-ta2-1-vector"))]
bind_vector!("__interrupt_vector_43", vecmux_timer2_a1, vecmux_timer2_a1_entry, timer2_a1);
#[cfg(not(feature = "disable-ta2-0-vector"))]
bind_vector!("__interrupt_vector_44", vecmux_timer2_a0, vecmux_timer2_a0_entry, timer2_a0);
#[cfg(not(feature = "disable-usci-b1-vector"))]
bind_vector!("__interrupt_vector_45", vecmux_usci_b1, vecmux_usci_b1_entry, usci_b1);
#[cfg(not(feature = "disable-usci-a1-vector"))]
bind_vector!("__interrupt_vector_46", vecmux_usci_a1, vecmux_usci_a1_entry, usci_a1);
#[cfg(not(feature = "disable-port1-vector"))]
bind_vector!("__interrupt_vector_47", vecmux_port1, vecmux_port1_entry, port1);
#[cfg(not(feature = "disable-ta1-1-vector"))]
bind_vector!("__interrupt_vector_48", vecmux_timer1_a1, vecmux_timer1_a1_entry, timer1_a1);
#[cfg(not(feature = "disable-ta1-0-vector"))]
bind_vector!("__interrupt_vector_49", vecmux_timer1_a0, vecmux_timer1_a0_entry, timer1_a0);
#[cfg(not(feature = "disable-dma-vector"))]
bind_vector!("__interrupt_vector_50", vecmux_dma, vecmux_dma_entry, dma);
#[cfg(not(feature = "disable-usb-vector"))]
bind_vector!("__interrupt_vector_51", vecmux_usb_ubm, vecmux_usb_ubm_entry, usb_ubm);
#[cfg(not(feature = "disable-ta0-1-vector"))]
bind_vector!("__interrupt_vector_52", vecmux_timer0_a1, vecmux_timer0_a1_entry, timer0_a1);
#[cfg(feature = "enable-ta0-cc0")]
bind_vector!("__interrupt_vector_53", vecmux_timer0_a0, vecmux_timer0_a0_entry, timer0_a0);
#[cfg(not(feature = "disable-adc10-vector"))]
bind_vector!("__interrupt_vector_54", vecmux_adc10, vecmux_adc10_entry, adc10);
#[cfg(not(feature = "disable-usci-b0-vector"))]
bind_vector!("__interrupt_vector_55", vecmux_usci_b0, vecmux_usci_b0_entry, usci_b0);
#[cfg(not(feature = "disable-usci-a0-vector"))]
bind_vector!("__interrupt_vector_56", vecmux_usci_a0, vecmux_usci_a0_entry, usci_a0);
#[cfg(feature = "enable-wdt")]
bind_vector!("__interrupt_vector_57", vecmux_wdt, vecmux_wdt_entry, wdt);
#[cfg(not(feature = "disable-tb0-1-vector"))]
bind_vector!("__interrupt_vector_58", vecmux_timer0_b1, vecmux_timer0_b1_entry, timer0_b1);
#[cfg(not(feature = "disable-tb0-0-vector"))]
bind_vector!("__interrupt_vector_59", vecmux_timer0_b0, vecmux_timer0_b0_entry, timer0_b0);
#[cfg(not(feature = "disable-comp-b-vector"))]
bind_vector!("__interrupt_vector_60", vecmux_comp_b, vecmux_comp_b_entry, comp_b);
#[cfg(not(feature = "disable-unmi-vector"))]
bind_vector!("__interrupt_vector_61", vecmux_unmi, vecmux_unmi_entry, unmi);
#[cfg(not(feature = "disable-sysnmi-vector"))]
bind_vector!("__interrupt_vector_62", vecmux_sysnmi, vecmux_sysnmi_entry, sysnmi);
#[cfg(feature = "enable-reset")]
bind_vector!("__interrupt_vector_63", vecmux_reset, vecmux_reset_entry, reset);
