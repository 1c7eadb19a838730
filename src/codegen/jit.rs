use super::error::CodegenError;

/// Anonymous mapping holding generated code. The buffer starts writable,
/// flips to read+execute once the code is installed, and stays mapped for
/// as long as the returned entry point may run.
pub struct JitBuffer {
    ptr: *mut libc::c_void,
    len: usize,
}

impl JitBuffer {
    pub fn map(len: usize) -> Result<Self, CodegenError> {
        let len = len.max(1);
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };

        if ptr == libc::MAP_FAILED {
            return Err(CodegenError::Emit {
                message: "mmap for the jit buffer failed".to_string(),
            });
        }

        Ok(Self { ptr, len })
    }

    /// Base address the code must be assembled against.
    pub fn base(&self) -> u64 {
        self.ptr as u64
    }

    /// Copies the code in and makes the mapping executable.
    pub fn install(&mut self, code: &[u8]) -> Result<(), CodegenError> {
        if code.len() > self.len {
            return Err(CodegenError::Emit {
                message: "generated code exceeds the jit buffer".to_string(),
            });
        }

        unsafe {
            std::ptr::copy_nonoverlapping(code.as_ptr(), self.ptr as *mut u8, code.len());
        }

        let result = unsafe { libc::mprotect(self.ptr, self.len, libc::PROT_READ | libc::PROT_EXEC) };
        if result != 0 {
            return Err(CodegenError::Emit {
                message: "mprotect on the jit buffer failed".to_string(),
            });
        }

        Ok(())
    }

    /// # Safety
    ///
    /// `install` must have completed with code whose entry point sits at the
    /// buffer base and follows the `extern "C" fn() -> i32` convention.
    pub unsafe fn entry(&self) -> extern "C" fn() -> i32 {
        std::mem::transmute(self.ptr)
    }
}

impl Drop for JitBuffer {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.ptr, self.len);
        }
    }
}
