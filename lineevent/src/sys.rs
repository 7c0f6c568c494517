use std::io::{self, Read};
use std::os::fd::{AsRawFd, BorrowedFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};

use lineevent_common::v1::{EventRequest, HandleData};

/*include/uapi/linux/gpio.h*/
const GPIO_IOC_MAGIC: u32 = 0xB4;

const fn iowr(nr: u32, size: usize) -> u32 {
    (3 << 30) | ((size as u32) << 16) | (GPIO_IOC_MAGIC << 8) | nr
}

pub const GPIO_GET_LINEEVENT_IOCTL: u32 = iowr(0x04, EventRequest::SIZE);
pub const GPIOHANDLE_GET_LINE_VALUES_IOCTL: u32 = iowr(0x08, HandleData::SIZE);

fn cvt(ret: libc::c_int) -> io::Result<libc::c_int> {
    match ret {
        -1 => Err(io::Error::last_os_error()),
        ret => Ok(ret),
    }
}

/// Issues a line event request on a chip descriptor and takes ownership of
/// the descriptor the kernel hands back.
pub fn request_line_event(chip: BorrowedFd<'_>, request: &EventRequest) -> io::Result<OwnedFd> {
    let mut buf = request.encode();
    cvt(unsafe {
        libc::ioctl(
            chip.as_raw_fd(),
            GPIO_GET_LINEEVENT_IOCTL as _,
            buf.as_mut_ptr(),
        )
    })?;
    let fd = EventRequest::result_fd(&buf);
    if fd < 0 {
        return Err(io::Error::from_raw_os_error(libc::EBADF));
    }
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

pub fn line_values(line: BorrowedFd<'_>) -> io::Result<HandleData> {
    let mut data = HandleData::default();
    cvt(unsafe {
        libc::ioctl(
            line.as_raw_fd(),
            GPIOHANDLE_GET_LINE_VALUES_IOCTL as _,
            data.values.as_mut_ptr(),
        )
    })?;
    Ok(data)
}

pub fn epoll_create() -> io::Result<OwnedFd> {
    let fd = cvt(unsafe { libc::epoll_create1(libc::EPOLL_CLOEXEC) })?;
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

pub fn epoll_add(epoll: BorrowedFd<'_>, fd: RawFd, events: u32, token: u64) -> io::Result<()> {
    let mut event = libc::epoll_event { events, u64: token };
    cvt(unsafe { libc::epoll_ctl(epoll.as_raw_fd(), libc::EPOLL_CTL_ADD, fd, &mut event) })?;
    Ok(())
}

pub fn epoll_wait(epoll: BorrowedFd<'_>, events: &mut [libc::epoll_event]) -> io::Result<usize> {
    let n = cvt(unsafe {
        libc::epoll_wait(
            epoll.as_raw_fd(),
            events.as_mut_ptr(),
            events.len() as libc::c_int,
            -1,
        )
    })?;
    Ok(n as usize)
}

pub fn eventfd() -> io::Result<OwnedFd> {
    let fd = cvt(unsafe { libc::eventfd(0, libc::EFD_CLOEXEC | libc::EFD_NONBLOCK) })?;
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

pub fn eventfd_signal(fd: BorrowedFd<'_>) -> io::Result<()> {
    let one = 1u64.to_ne_bytes();
    let n = unsafe { libc::write(fd.as_raw_fd(), one.as_ptr().cast(), one.len()) };
    if n < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Closes `fd` and reports the error `Drop for OwnedFd` would swallow.
pub fn close(fd: OwnedFd) -> io::Result<()> {
    cvt(unsafe { libc::close(fd.into_raw_fd()) })?;
    Ok(())
}

/// Reads from a descriptor it does not own.
pub struct FdReader<'a>(pub BorrowedFd<'a>);

impl Read for FdReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = unsafe { libc::read(self.0.as_raw_fd(), buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }
}
