#[macro_export]
macro_rules! BIT {
    ( $x:expr ) => {
        1u32 << $x
    };
}

#[macro_export]
macro_rules! BIT_MASK_LEN {
    ( $x:expr ) => {
        $crate::BIT!($x) - 1
    };
}

// bits range: BIT_RNG(4, 7)  0b11110000,  start from 4, end at 7 inclusive
#[macro_export]
macro_rules! BIT_RNG {
    ( $s:expr, $e:expr ) => {
        $crate::BIT_MASK_LEN!($e - $s + 1) << $s
    };
}

#[macro_export]
macro_rules! BM_SET {
    ( $x:expr, $mask:expr ) => {
        $x |= $mask
    };
}

#[macro_export]
macro_rules! BM_CLR {
    ( $x:expr, $mask:expr ) => {
        $x &= !($mask)
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_bit() {
        assert_eq!(BIT!(0), 0x01);
        assert_eq!(BIT!(7), 0x80);
        assert_eq!(BIT!(31), 0x8000_0000);
    }

    #[test]
    fn test_bit_rng() {
        // One PCTL nibble per pin
        assert_eq!(BIT_RNG!(0, 3), 0x0000_000F);
        assert_eq!(BIT_RNG!(4, 7), 0x0000_00F0);
        assert_eq!(BIT_RNG!(28, 31), 0xF000_0000);
    }

    #[test]
    fn test_bm_set_clr() {
        let mut val = 0xF0u32;
        BM_SET!(val, BIT!(1));
        assert_eq!(val, 0xF2);
        BM_CLR!(val, BIT!(4) | BIT!(1));
        assert_eq!(val, 0xE0);
    }
}
