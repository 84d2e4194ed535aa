use errors::Result;
use std::fmt;

/// A pointer into a buffer of bytes. Used for reading the little-endian
/// binary parts of texture files.
#[derive(Copy, Clone)]
pub struct Cur<'a> {
    buf_: &'a [u8],
    pos_: usize,
}

impl<'a> Cur<'a> {
    pub fn new(buf: &[u8]) -> Cur {
        Cur { buf_: buf, pos_: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos_
    }

    pub fn bytes_remaining(&self) -> usize {
        self.buf_.len().saturating_sub(self.pos_)
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.next_n_u8s(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16> {
        let b = self.next_n_u8s(2)?;
        Ok(b[0] as u16 | (b[1] as u16) << 8)
    }

    pub fn u32(&mut self) -> Result<u32> {
        let b = self.next_n_u8s(4)?;
        Ok(b[0] as u32 | (b[1] as u32) << 8 | (b[2] as u32) << 16 | (b[3] as u32) << 24)
    }

    pub fn next_n_u8s(&mut self, n: usize) -> Result<&'a [u8]> {
        let end_pos = self.pos_.checked_add(n);
        match end_pos {
            Some(end) if end <= self.buf_.len() => {
                let res = &self.buf_[self.pos_ .. end];
                self.pos_ = end;
                Ok(res)
            }
            _ => bail!("buffer was too short"),
        }
    }

    pub fn jump_to(&mut self, pos: usize) {
        self.pos_ = pos;
    }
}

impl<'a> fmt::Debug for Cur<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Cur {{ pos: {} }}", self.pos())
    }
}

#[test]
fn test() {
    let buf = [0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xff];
    let mut cur = Cur::new(&buf);
    assert_eq!(cur.u8().unwrap(), 0x01);
    assert_eq!(cur.u16().unwrap(), 0x1234);
    assert_eq!(cur.u32().unwrap(), 0x12345678);
    assert_eq!(cur.bytes_remaining(), 1);
    assert!(cur.u16().is_err());
    cur.jump_to(7);
    assert_eq!(cur.u8().unwrap(), 0xff);
}
